// ==========================================
// 学员名册导入系统 - 领域类型定义
// ==========================================
// 职责: 标准字段、行状态、表格格式等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 顺序即表头识别时的列认领顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    FirstName,
    LastName,
    Gender,
    CellPhone,
    TelHome,
    TelEmergency,
    Whatsapp,
    Telegram,
    AccessionNumber,
}

impl CanonicalField {
    /// 全部标准字段（按认领顺序）
    pub const ALL: [CanonicalField; 9] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Gender,
        CanonicalField::CellPhone,
        CanonicalField::TelHome,
        CanonicalField::TelEmergency,
        CanonicalField::Whatsapp,
        CanonicalField::Telegram,
        CanonicalField::AccessionNumber,
    ];

    /// 字段数量
    pub const COUNT: usize = 9;

    /// 字段在 ColumnIndexMap 中的槽位
    pub fn slot(self) -> usize {
        self as usize
    }

    /// 对外字段名（camelCase，与上传接口一致）
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::FirstName => "firstName",
            CanonicalField::LastName => "lastName",
            CanonicalField::Gender => "gender",
            CanonicalField::CellPhone => "cellPhone",
            CanonicalField::TelHome => "telHome",
            CanonicalField::TelEmergency => "telEmergency",
            CanonicalField::Whatsapp => "whatsapp",
            CanonicalField::Telegram => "telegram",
            CanonicalField::AccessionNumber => "accessionNumber",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 行状态 (Row Status)
// ==========================================
// 红线: 没有"部分有效"状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Valid,   // 可提交
    Invalid, // 存在阻断错误
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Valid => write!(f, "VALID"),
            RowStatus::Invalid => write!(f, "INVALID"),
        }
    }
}

// ==========================================
// 表格格式 (Spreadsheet Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Csv,  // 分隔文本
    Xlsx, // Office Open XML 工作簿
    Xls,  // 旧版二进制工作簿
    Ods,  // OpenDocument 工作簿
}

impl SpreadsheetFormat {
    /// 标准扩展名
    pub fn extension(self) -> &'static str {
        match self {
            SpreadsheetFormat::Csv => "csv",
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Xls => "xls",
            SpreadsheetFormat::Ods => "ods",
        }
    }

    /// 由扩展名识别（不区分大小写，可带前导点）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" | "txt" => Some(SpreadsheetFormat::Csv),
            "xlsx" | "xlsm" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            "ods" => Some(SpreadsheetFormat::Ods),
            _ => None,
        }
    }

    /// 由 MIME 类型识别（忽略 `; charset=...` 等参数）
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "text/csv" | "application/csv" | "text/plain" => Some(SpreadsheetFormat::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(SpreadsheetFormat::Xlsx)
            }
            "application/vnd.ms-excel" => Some(SpreadsheetFormat::Xls),
            "application/vnd.oasis.opendocument.spreadsheet" => Some(SpreadsheetFormat::Ods),
            _ => None,
        }
    }

    /// 是否为二进制工作簿
    pub fn is_workbook(self) -> bool {
        !matches!(self, SpreadsheetFormat::Csv)
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
