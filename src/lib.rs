// ==========================================
// 学员名册导入系统 - 核心库
// ==========================================
// 职责: 表格名册导入、表头识别、逐行校验、批量提交
// 流程: 选择文件 → 预览确认 → 一次性提交 → 导入报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 文件解析与校验
pub mod importer;

// 提交层 - 外部持久化接口
pub mod uploader;

// 配置层 - 导入参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 导入流程
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CanonicalField, RowStatus, SpreadsheetFormat};

// 领域实体
pub use domain::{
    BatchSummary, CandidateRecord, ImportPreview, ImportReport, RawGrid, ReportedError,
    UploadResult,
};

// 导入器
pub use importer::{ImportError, RosterImporter, RosterImporterImpl};

// 提交
pub use uploader::{BatchUploadClient, HttpBatchUploadClient, UploadError};

// 配置
pub use config::{ConfigManager, ImportConfigReader};

// API
pub use api::{ApiError, ImportWorkflow, WorkflowStage};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学员名册导入系统";
