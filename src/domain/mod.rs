// ==========================================
// 学员名册导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含解析逻辑,不含网络访问
// ==========================================

pub mod roster;
pub mod types;

// 重导出核心类型
pub use roster::{
    BatchSummary, CandidateRecord, ColumnIndexMap, ErrorOrigin, HeaderLocation, ImportPreview,
    ImportReport, RawGrid, ReportedError, RowError, RowWarning, UploadResult, ValidationOutcome,
    PREVIEW_LIMIT,
};
pub use types::{CanonicalField, RowStatus, SpreadsheetFormat};
