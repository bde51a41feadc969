// ==========================================
// 学员名册导入系统 - 名册领域模型
// ==========================================
// 职责: 导入管道各阶段的中间产物与结果
// 生命周期: 仅在单次文件处理内（不跨尝试保留）
// ==========================================

use crate::domain::types::{CanonicalField, RowStatus, SpreadsheetFormat};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// 预览最多展示的有效记录数
pub const PREVIEW_LIMIT: usize = 3;

// ==========================================
// RawGrid - 原始单元格网格
// ==========================================
// 用途: 文件解码产物，未做任何语义解释
// 约束: 矩形（短行以空串补齐），构造后不可变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

impl RawGrid {
    /// 由任意行构造，短行补齐到最宽行
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列数（矩形宽度）
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}

// ==========================================
// ColumnIndexMap - 标准字段 → 列号
// ==========================================
// 表头定位后一次性构建，之后只读、按值传递
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnIndexMap {
    columns: [Option<usize>; CanonicalField::COUNT],
}

impl ColumnIndexMap {
    /// 返回绑定了 `field → column` 的新映射
    pub fn with(mut self, field: CanonicalField, column: usize) -> Self {
        self.columns[field.slot()] = Some(column);
        self
    }

    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field.slot()]
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    /// 某列是否已被任一字段认领
    pub fn is_claimed(&self, column: usize) -> bool {
        self.columns.iter().any(|c| *c == Some(column))
    }

    /// 已识别的字段（按标准顺序）
    pub fn resolved_fields(&self) -> impl Iterator<Item = (CanonicalField, usize)> + '_ {
        CanonicalField::ALL
            .iter()
            .filter_map(move |f| self.get(*f).map(|c| (*f, c)))
    }

    /// 取行内某字段的原始单元格；缺列或越界时为空串
    pub fn cell<'a>(&self, row: &'a [String], field: CanonicalField) -> &'a str {
        self.get(field)
            .and_then(|c| row.get(c))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Serialize for ColumnIndexMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CanonicalField::COUNT))?;
        for field in CanonicalField::ALL {
            map.serialize_entry(field.as_str(), &self.get(field))?;
        }
        map.end()
    }
}

// ==========================================
// HeaderLocation - 表头定位结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLocation {
    pub header_row_index: usize,     // 表头所在行（0 起）
    pub column_map: ColumnIndexMap,  // 字段列映射
}

// ==========================================
// CandidateRecord - 候选记录
// ==========================================
// 每个非空数据行一条，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub row_number: usize, // 表格行号（1 起，与电子表格显示一致）

    // 基础信息
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub accession_number: String,

    // 电话（已去除 "(H)"/"(E)" 等角色前缀）
    pub cell_phone: String,
    pub tel_home: String,
    pub tel_emergency: String,
    pub phone: String, // 派生: cellPhone → telHome → telEmergency

    // 即时通讯（独立字段，不并入 phone）
    pub whatsapp: String,
    pub telegram: String,
}

// ==========================================
// RowError / RowWarning - 行级问题
// ==========================================
/// 阻断错误：该行不进入提交集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// 非阻断警告：仅提示，不改变行状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    pub row: usize,
    pub field: CanonicalField,
    pub message: String,
}

// ==========================================
// ValidationOutcome - 单行校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub record: CandidateRecord,
    pub status: RowStatus,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
}

impl ValidationOutcome {
    /// 无阻断错误即可提交
    pub fn is_ready(&self) -> bool {
        self.status == RowStatus::Valid
    }
}

// ==========================================
// BatchSummary - 批次汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_rows: usize,     // 非空数据行
    pub valid_rows: usize,     // 可提交
    pub invalid_rows: usize,   // 阻断
    pub duplicate_rows: usize, // 服务端去重数（提交前恒为 0）

    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,

    pub preview: Vec<CandidateRecord>,       // 前 PREVIEW_LIMIT 条有效记录
    pub ready_records: Vec<CandidateRecord>, // 全部有效记录（原始行序）
}

// ==========================================
// ReportedError - 最终报告中的错误条目
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorOrigin {
    Client, // 本地校验
    Server, // 服务端返回
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedError {
    pub row: Option<usize>,
    pub message: String,
    pub origin: ErrorOrigin,
}

impl From<&RowError> for ReportedError {
    fn from(err: &RowError) -> Self {
        Self {
            row: Some(err.row),
            message: err.message.clone(),
            origin: ErrorOrigin::Client,
        }
    }
}

// ==========================================
// UploadResult - 提交结果（已与本地结果合并）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub submitted: usize,          // 本次提交记录数
    pub inserted: usize,           // 服务端新增
    pub duplicates_skipped: usize, // 服务端去重跳过
    pub unaccounted: usize,        // submitted - inserted - duplicates（不为负）
    pub errors: Vec<ReportedError>, // 本地错误在前，服务端错误追加
}

// ==========================================
// ImportPreview - 待确认的导入批次
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub format: SpreadsheetFormat,
    pub header_row_index: usize,
    pub column_map: ColumnIndexMap,
    pub summary: BatchSummary,
    pub parsed_at: DateTime<Utc>,
}

// ==========================================
// ImportReport - 最终导入报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub summary: BatchSummary, // duplicate_rows 已按服务端结果回填
    pub upload: UploadResult,
    pub completed_at: DateTime<Utc>,
}
