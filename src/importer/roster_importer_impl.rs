// ==========================================
// 学员名册导入系统 - 名册导入器实现
// ==========================================
// 职责: 串联单次文件处理，从字节到待确认预览
// 流程: 解析前检查 → 解码 → 表头定位 → 逐行校验 → 汇总
// 说明: 全程同步执行；每次调用独占自己的网格与结果，不共享可变状态
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::roster::{BatchSummary, HeaderLocation, ImportPreview, RawGrid};
use crate::domain::types::SpreadsheetFormat;
use crate::importer::batch_assembler::assemble;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_locator::locate;
use crate::importer::roster_importer_trait::{RosterImporter, RowValidator};
use crate::importer::row_validator::RowValidatorImpl;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RosterImporterImpl - 名册导入器实现
// ==========================================
pub struct RosterImporterImpl {
    // 导入组件
    file_parser: UniversalFileParser,
    row_validator: Box<dyn RowValidator>,
}

impl Default for RosterImporterImpl {
    fn default() -> Self {
        Self::new(UniversalFileParser::default(), Box::new(RowValidatorImpl))
    }
}

impl RosterImporterImpl {
    /// 创建新的 RosterImporter 实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器（含大小上限与可接受格式）
    /// - row_validator: 行校验器
    pub fn new(file_parser: UniversalFileParser, row_validator: Box<dyn RowValidator>) -> Self {
        Self {
            file_parser,
            row_validator,
        }
    }

    /// 按配置创建（大小上限、可接受格式）
    pub fn from_config<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        let file_parser = UniversalFileParser::new(
            config.get_max_file_size_bytes()?,
            config.get_accepted_formats()?,
        );
        Ok(Self::new(file_parser, Box::new(RowValidatorImpl)))
    }

    /// 表头定位 + 逐行校验 + 汇总（纯计算，可重复执行）
    pub fn validate_grid(&self, grid: &RawGrid) -> ImportResult<(HeaderLocation, BatchSummary)> {
        let location = locate(grid)?;

        let outcomes = grid
            .rows()
            .iter()
            .enumerate()
            .skip(location.header_row_index + 1)
            .filter_map(|(idx, row)| {
                self.row_validator
                    .validate(row, location.column_map, idx + 1)
            })
            .collect::<Vec<_>>();

        Ok((location, assemble(outcomes)))
    }

    /// 解码之后的公共流程
    fn run(
        &self,
        bytes: &[u8],
        format: SpreadsheetFormat,
        file_name: Option<&str>,
    ) -> ImportResult<ImportPreview> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, file_name = ?file_name, format = %format, size = bytes.len(), "开始处理名册文件");

        // === 步骤 1: 解码 ===
        let grid = self.file_parser.decode(bytes, format).map_err(|e| {
            error!(batch_id = %batch_id, error = %e, "文件解码失败");
            e
        })?;
        debug!(rows = grid.len(), cols = grid.width(), "文件解码完成");

        // === 步骤 2-4: 表头定位 + 逐行校验 + 汇总 ===
        let (location, summary) = self.validate_grid(&grid).map_err(|e| {
            warn!(batch_id = %batch_id, error = %e, "表头定位失败");
            e
        })?;

        info!(
            batch_id = %batch_id,
            header_row_index = location.header_row_index,
            total = summary.total_rows,
            valid = summary.valid_rows,
            invalid = summary.invalid_rows,
            warnings = summary.warnings.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "名册文件处理完成"
        );

        Ok(ImportPreview {
            batch_id,
            file_name: file_name.map(str::to_string),
            format,
            header_row_index: location.header_row_index,
            column_map: location.column_map,
            summary,
            parsed_at: Utc::now(),
        })
    }
}

impl RosterImporter for RosterImporterImpl {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn process(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> ImportResult<ImportPreview> {
        // === 步骤 0: 解析前检查 ===
        let format = self
            .file_parser
            .detect_format_from(file_name, mime_type)
            .and_then(|format| {
                self.file_parser.check_size(bytes.len() as u64)?;
                Ok(format)
            })
            .map_err(|e| {
                warn!(error = %e, "文件在解析前被拒绝");
                e
            })?;

        self.run(bytes, format, file_name)
    }

    #[instrument(skip(self))]
    fn process_path(&self, file_path: &Path) -> ImportResult<ImportPreview> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        // 先查格式与大小，再读取内容
        let format = self
            .file_parser
            .detect_format_from(file_name.as_deref(), None)?;
        self.file_parser
            .check_size(std::fs::metadata(file_path)?.len())?;

        let bytes = std::fs::read(file_path)?;
        self.run(&bytes, format, file_name.as_deref())
    }
}
