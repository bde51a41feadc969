// ==========================================
// 学员名册导入系统 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 流程: 解析 → 表头定位 → 逐行校验 → 汇总
// ==========================================

use crate::domain::roster::{ColumnIndexMap, ImportPreview, RawGrid, ValidationOutcome};
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// RosterImporter Trait
// ==========================================
// 用途: 单次文件处理主接口
// 实现者: RosterImporterImpl
pub trait RosterImporter: Send + Sync {
    /// 处理一份上传文件，产出待确认的预览
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    /// - file_name: 原始文件名（用于识别扩展名，可选）
    /// - mime_type: 浏览器上报的 MIME 类型（可选）
    ///
    /// # 返回
    /// - Ok(ImportPreview): 汇总、错误/警告、预览与待提交记录
    /// - Err: 文件级错误（格式/大小/解码/表头），本次尝试作废
    ///
    /// # 流程（4个阶段）
    /// 1. 解析前检查 + 解码为 RawGrid
    /// 2. 表头定位 → ColumnIndexMap
    /// 3. 逐行校验 → ValidationOutcome
    /// 4. 汇总 → BatchSummary
    fn process(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> ImportResult<ImportPreview>;

    /// 从磁盘文件处理（以路径扩展名识别格式）
    fn process_path(&self, file_path: &Path) -> ImportResult<ImportPreview>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 字节解码接口（阶段 1）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 将文件字节解码为矩形网格
    ///
    /// # 返回
    /// - Ok(RawGrid): 含空行的完整网格
    /// - Err(ParseError): 字节无法解码
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 单行校验接口（阶段 3）
// 实现者: RowValidatorImpl
pub trait RowValidator: Send + Sync {
    /// 校验一行数据
    ///
    /// # 参数
    /// - row: 原始单元格
    /// - column_map: 表头定位得到的列映射
    /// - row_number: 表格行号（1 起）
    ///
    /// # 返回
    /// - None: 整行空白，跳过且不计数
    /// - Some(ValidationOutcome): Valid / Invalid 及错误、警告
    fn validate(
        &self,
        row: &[String],
        column_map: ColumnIndexMap,
        row_number: usize,
    ) -> Option<ValidationOutcome>;
}
