// ==========================================
// 学员名册导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 来源优先级: 环境变量 > JSON 配置文件 > 内置默认值
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::SpreadsheetFormat;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::DEFAULT_MAX_FILE_SIZE_BYTES;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const MAX_FILE_SIZE_BYTES: &str = "max_file_size_bytes";
    pub const ACCEPTED_FORMATS: &str = "accepted_formats";
    pub const UPLOAD_ENDPOINT: &str = "upload_endpoint";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";

    /// 全部配置键（用于环境变量覆写）
    pub const ALL: [&str; 4] = [
        MAX_FILE_SIZE_BYTES,
        ACCEPTED_FORMATS,
        UPLOAD_ENDPOINT,
        REQUEST_TIMEOUT_SECS,
    ];
}

/// 环境变量前缀，如 ROSTER_IMPORT_UPLOAD_ENDPOINT
pub const ENV_PREFIX: &str = "ROSTER_IMPORT_";

/// 显式指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "ROSTER_IMPORT_CONFIG";

const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:3000/api/learners/batch";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";
const DEFAULT_ACCEPTED_FORMATS: &str = "csv,xlsx,xls,ods";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值表创建
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 从 JSON 配置文件创建
    ///
    /// # 格式
    /// 顶层为对象；数组值按逗号拼接，数字/布尔按字面量保存
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;

        let object = json.as_object().ok_or_else(|| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: "配置文件顶层必须是对象".to_string(),
        })?;

        let values = object
            .iter()
            .map(|(key, value)| (key.clone(), json_to_config_string(value)))
            .collect::<HashMap<_, _>>();

        debug!(path = %path.display(), keys = values.len(), "配置文件加载完成");
        Ok(Self { values })
    }

    /// 用 ROSTER_IMPORT_* 环境变量覆写
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// 用任意查找函数覆写（环境变量覆写的可测形式）
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in config_keys::ALL {
            let env_name = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Some(value) = lookup(&env_name) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    debug!(key = key, source = %env_name, "环境变量覆写配置");
                    self.values.insert(key.to_string(), trimmed.to_string());
                }
            }
        }
        self
    }

    /// 标准加载: 配置文件（存在时） + 环境变量
    pub fn load() -> ImportResult<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|p| PathBuf::from(p.trim()))
            .filter(|p| !p.as_os_str().is_empty());

        let manager = match explicit.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "使用配置文件");
                Self::from_json_file(&path)?
            }
            _ => Self::new(),
        };

        Ok(manager.with_env_overrides())
    }

    /// 默认配置文件位置: <用户配置目录>/roster-import/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roster-import").join("config.json"))
    }

    /// 设置单个配置值
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_config_value(key).unwrap_or(default)
    }

    fn value_error(key: &str, value: &str, message: impl Into<String>) -> ImportError {
        ImportError::ConfigValueError {
            key: key.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

fn json_to_config_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(json_to_config_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_max_file_size_bytes(&self) -> ImportResult<u64> {
        let default = DEFAULT_MAX_FILE_SIZE_BYTES.to_string();
        let value = self.get_config_or_default(config_keys::MAX_FILE_SIZE_BYTES, &default);
        match value.trim().parse::<u64>() {
            Ok(0) => Err(Self::value_error(
                config_keys::MAX_FILE_SIZE_BYTES,
                value,
                "必须大于 0",
            )),
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(Self::value_error(
                config_keys::MAX_FILE_SIZE_BYTES,
                value,
                e.to_string(),
            )),
        }
    }

    fn get_accepted_formats(&self) -> ImportResult<Vec<SpreadsheetFormat>> {
        let value = self.get_config_or_default(config_keys::ACCEPTED_FORMATS, DEFAULT_ACCEPTED_FORMATS);

        let mut formats = Vec::new();
        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let format = SpreadsheetFormat::from_extension(item).ok_or_else(|| {
                Self::value_error(config_keys::ACCEPTED_FORMATS, value, format!("未知格式: {}", item))
            })?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        if formats.is_empty() {
            return Err(Self::value_error(
                config_keys::ACCEPTED_FORMATS,
                value,
                "至少需要一种格式",
            ));
        }
        Ok(formats)
    }

    fn get_upload_endpoint(&self) -> ImportResult<String> {
        let value = self.get_config_or_default(config_keys::UPLOAD_ENDPOINT, DEFAULT_UPLOAD_ENDPOINT);
        let parsed = url::Url::parse(value.trim())
            .map_err(|e| Self::value_error(config_keys::UPLOAD_ENDPOINT, value, e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed.to_string()),
            scheme => Err(Self::value_error(
                config_keys::UPLOAD_ENDPOINT,
                value,
                format!("不支持的协议: {}", scheme),
            )),
        }
    }

    fn get_request_timeout(&self) -> ImportResult<Duration> {
        let value =
            self.get_config_or_default(config_keys::REQUEST_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS);
        match value.trim().parse::<u64>() {
            Ok(0) => Err(Self::value_error(
                config_keys::REQUEST_TIMEOUT_SECS,
                value,
                "必须大于 0",
            )),
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(e) => Err(Self::value_error(
                config_keys::REQUEST_TIMEOUT_SECS,
                value,
                e.to_string(),
            )),
        }
    }
}
