// ==========================================
// 学员名册导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 范围: 文件级错误（任一发生即放弃本次导入）
// 行级错误/警告不走 Err，见 domain::roster::RowError
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 解析前拒绝 =====
    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls/.ods）")]
    UnsupportedFormat(String),

    // ===== 文件读取错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 解码错误 =====
    #[error("文件解析失败: {0}")]
    ParseError(String),

    // ===== 表头错误 =====
    #[error("未找到表头: 没有任何一行同时包含名字列与姓氏列")]
    HeaderNotFound,

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否属于解析前拒绝（格式/大小）
    pub fn is_pre_parse_reject(&self) -> bool {
        matches!(
            self,
            ImportError::FileTooLarge { .. } | ImportError::UnsupportedFormat(_)
        )
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ParseError(format!("CSV: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ParseError(format!("工作簿: {}", err))
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ParseError(format!("xlsx: {}", err))
    }
}

impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::ParseError(format!("xls: {}", err))
    }
}

impl From<calamine::OdsError> for ImportError {
    fn from(err: calamine::OdsError) -> Self {
        ImportError::ParseError(format!("ods: {}", err))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
