// ==========================================
// 学员名册导入系统 - 下载模板
// ==========================================
// 职责: 生成标准列顺序 + 一行示例的 CSV 模板
// ==========================================

use crate::domain::types::CanonicalField;
use crate::importer::error::{ImportError, ImportResult};
use csv::WriterBuilder;

/// 模板表头（每个字段取第一个别名，保证可被识别）
pub fn template_headers() -> Vec<&'static str> {
    CanonicalField::ALL
        .iter()
        .map(|field| field.aliases()[0])
        .collect()
}

/// 示例行（与表头同序）
const EXAMPLE_ROW: [&str; CanonicalField::COUNT] = [
    "Thandi",
    "Mokoena",
    "F",
    "+27 82 123 4567",
    "(H) 011 555 0101",
    "(E) 083 555 0199",
    "+27821234567",
    "@thandi_m",
    "2024-0417",
];

/// 生成模板 CSV 文本
pub fn template_csv() -> ImportResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(template_headers())?;
    writer.write_record(EXAMPLE_ROW)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::InternalError(format!("模板写出失败: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ImportError::InternalError(e.to_string()))
}
