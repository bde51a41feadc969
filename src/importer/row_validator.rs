// ==========================================
// 学员名册导入系统 - 行校验器实现
// ==========================================
// 阶段 3: 字段提取 + 必填校验（阻断） + 电话形态校验（警告）
// 红线: 不做号码数值解析，只看形态；警告永不改变行状态
// ==========================================

use crate::domain::roster::{CandidateRecord, ColumnIndexMap, RowError, RowWarning, ValidationOutcome};
use crate::domain::types::{CanonicalField, RowStatus};
use crate::importer::roster_importer_trait::RowValidator;
use once_cell::sync::Lazy;
use regex::Regex;

// 可选前导 '+'，其后只允许数字/空白/连字符/括号
static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("PHONE_SHAPE 正则非法"));

// 电话前的角色标记，如 "(H)"、"(E)"、"(W) "
static ROLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*\(\s*[A-Za-z]{1,3}\s*\)\s*)+").expect("ROLE_MARKER 正则非法"));

pub struct RowValidatorImpl;

impl RowValidator for RowValidatorImpl {
    fn validate(
        &self,
        row: &[String],
        column_map: ColumnIndexMap,
        row_number: usize,
    ) -> Option<ValidationOutcome> {
        // 1. 整行空白: 跳过，不计数
        if is_blank_row(row) {
            return None;
        }

        // 2-3. 提取字段
        let record = extract_record(row, column_map, row_number);

        // 4. 必填校验（最多一条阻断错误）
        let mut errors = Vec::new();
        let missing: Vec<&str> = [
            (CanonicalField::FirstName, &record.first_name),
            (CanonicalField::LastName, &record.last_name),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field.as_str())
        .collect();

        if !missing.is_empty() {
            errors.push(RowError {
                row: row_number,
                message: format!("第 {} 行缺少必填字段: {}", row_number, missing.join(", ")),
            });
        }

        // 5. 形态校验（仅警告）
        let mut warnings = Vec::new();
        if let Some(source) = phone_source(&record) {
            if !is_phone_shaped(&record.phone) {
                warnings.push(shape_warning(row_number, source, &record.phone));
            }
        }
        if !record.whatsapp.is_empty() && !is_phone_shaped(&record.whatsapp) {
            warnings.push(shape_warning(row_number, CanonicalField::Whatsapp, &record.whatsapp));
        }

        // 6. 判定
        let status = if errors.is_empty() {
            RowStatus::Valid
        } else {
            RowStatus::Invalid
        };

        Some(ValidationOutcome {
            record,
            status,
            errors,
            warnings,
        })
    }
}

/// 所有单元格为空或仅含空白
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// 宽松电话形态: 可选 '+'，其余为数字/空白/连字符/括号
pub fn is_phone_shaped(value: &str) -> bool {
    PHONE_SHAPE.is_match(value)
}

/// 去掉前导角色标记并 trim
pub fn strip_role_marker(value: &str) -> String {
    ROLE_MARKER.replace(value.trim(), "").trim().to_string()
}

fn extract_record(row: &[String], column_map: ColumnIndexMap, row_number: usize) -> CandidateRecord {
    let text = |field: CanonicalField| column_map.cell(row, field).trim().to_string();
    let phone_text = |field: CanonicalField| strip_role_marker(column_map.cell(row, field));

    let cell_phone = phone_text(CanonicalField::CellPhone);
    let tel_home = phone_text(CanonicalField::TelHome);
    let tel_emergency = phone_text(CanonicalField::TelEmergency);

    // COALESCE(cellPhone, telHome, telEmergency)
    let phone = [&cell_phone, &tel_home, &tel_emergency]
        .into_iter()
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default();

    CandidateRecord {
        row_number,
        first_name: text(CanonicalField::FirstName),
        last_name: text(CanonicalField::LastName),
        gender: text(CanonicalField::Gender),
        accession_number: text(CanonicalField::AccessionNumber),
        cell_phone,
        tel_home,
        tel_emergency,
        phone,
        whatsapp: text(CanonicalField::Whatsapp),
        telegram: text(CanonicalField::Telegram),
    }
}

/// phone 取自哪个源字段（phone 为空时为 None）
fn phone_source(record: &CandidateRecord) -> Option<CanonicalField> {
    if !record.cell_phone.is_empty() {
        Some(CanonicalField::CellPhone)
    } else if !record.tel_home.is_empty() {
        Some(CanonicalField::TelHome)
    } else if !record.tel_emergency.is_empty() {
        Some(CanonicalField::TelEmergency)
    } else {
        None
    }
}

fn shape_warning(row: usize, field: CanonicalField, value: &str) -> RowWarning {
    RowWarning {
        row,
        field,
        message: format!("第 {} 行 {} 格式可疑: {}", row, field, value),
    }
}
