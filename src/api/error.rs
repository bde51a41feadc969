// ==========================================
// 学员名册导入系统 - API层错误类型
// ==========================================
// 职责: 聚合导入层与提交层错误，供调用方统一展示
// ==========================================

use crate::importer::error::ImportError;
use crate::uploader::error::UploadError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 文件阶段错误（流程回到选择文件）
    // ==========================================
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    // ==========================================
    // 提交阶段错误（流程回到确认步骤，批次保留）
    // ==========================================
    #[error("批量提交失败: {0}")]
    Upload(#[from] UploadError),

    // ==========================================
    // 流程错误
    // ==========================================
    #[error("当前状态不允许该操作: stage={stage}, action={action}")]
    InvalidState { stage: String, action: String },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 文件级错误（解析前拒绝、解码失败、表头缺失）
    pub fn is_file_error(&self) -> bool {
        matches!(self, ApiError::Import(_))
    }

    /// 提交阶段错误
    pub fn is_upload_error(&self) -> bool {
        matches!(self, ApiError::Upload(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
