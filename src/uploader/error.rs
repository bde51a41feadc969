// ==========================================
// 学员名册导入系统 - 提交层错误类型
// ==========================================
// 职责: 批量提交阶段的错误（整批失败，无部分成功）
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    // ==========================================
    // 提交前错误
    // ==========================================
    #[error("没有可提交的记录")]
    NothingToSubmit,

    #[error("提交地址无效: {0}")]
    InvalidEndpoint(String),

    #[error("提交配置错误: {0}")]
    Config(String),

    // ==========================================
    // 网络/服务端错误
    // ==========================================
    #[error("网络错误: {0}")]
    Network(String),

    #[error("服务端错误: status={status}, body={body}")]
    Server { status: u16, body: String },

    #[error("服务端响应无法解析: {0}")]
    InvalidResponse(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UploadError {
    /// 是否为服务端明确拒绝（非 2xx）
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, UploadError::Server { .. })
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UploadError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            UploadError::Server {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            UploadError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for UploadError {
    fn from(err: url::ParseError) -> Self {
        UploadError::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::InvalidResponse(err.to_string())
    }
}
