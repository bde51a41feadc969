// ==========================================
// 学员名册导入系统 - 提交层
// ==========================================
// 职责: 将已确认批次一次性提交到外部持久化接口，并合并结果
// ==========================================

pub mod client;
pub mod error;
pub mod submitter;

// 重导出核心类型
pub use client::{
    BatchUploadClient, HttpBatchUploadClient, ServerBatchResponse, ServerErrorDetail,
    ServerErrorEntry,
};
pub use error::UploadError;
pub use submitter::{reconcile, UploadSubmitter};
