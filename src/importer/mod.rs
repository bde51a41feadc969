// ==========================================
// 学员名册导入系统 - 导入层
// ==========================================
// 职责: 表格文件 → 待确认批次
// 支持: CSV, Excel (xlsx/xls), ODS
// 流程: 文件解析 → 表头定位 → 逐行校验 → 批次汇总
// ==========================================

// 模块声明
pub mod batch_assembler;
pub mod error;
pub mod field_alias;
pub mod file_parser;
pub mod header_locator;
pub mod roster_importer_impl;
pub mod roster_importer_trait;
pub mod row_validator;
pub mod template;

// 重导出核心类型
pub use batch_assembler::assemble;
pub use error::{ImportError, ImportResult};
pub use field_alias::{matches, normalize_header};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser, DEFAULT_MAX_FILE_SIZE_BYTES};
pub use header_locator::locate;
pub use roster_importer_impl::RosterImporterImpl;
pub use row_validator::RowValidatorImpl;
pub use template::template_csv;

// 重导出 Trait 接口
pub use roster_importer_trait::{FileParser, RosterImporter, RowValidator};
