// ==========================================
// 学员名册导入系统 - API 层
// ==========================================
// 职责: 向界面层提供导入流程接口
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportWorkflow, WorkflowStage};
