// ==========================================
// 学员名册导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入与提交所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::SpreadsheetFormat;
use crate::importer::error::ImportResult;
use std::time::Duration;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入/提交模块所需的配置读取接口
// 实现者: ConfigManager（JSON 文件 + 环境变量）
pub trait ImportConfigReader: Send + Sync {
    // ===== 文件检查配置 =====

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 5242880（5 MB）
    fn get_max_file_size_bytes(&self) -> ImportResult<u64>;

    /// 获取可接受的文件格式
    ///
    /// # 默认值
    /// - csv, xlsx, xls, ods
    fn get_accepted_formats(&self) -> ImportResult<Vec<SpreadsheetFormat>>;

    // ===== 批量提交配置 =====

    /// 获取批量提交接口地址
    ///
    /// # 默认值
    /// - http://localhost:3000/api/learners/batch
    fn get_upload_endpoint(&self) -> ImportResult<String>;

    /// 获取提交请求超时
    ///
    /// # 默认值
    /// - 30 秒
    ///
    /// # 用途
    /// - 提交无法取消，超时是等待的唯一上界
    fn get_request_timeout(&self) -> ImportResult<Duration>;
}
