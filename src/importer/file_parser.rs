// ==========================================
// 学员名册导入系统 - 文件解析器实现
// ==========================================
// 阶段 0: 解析前检查（格式/大小） + 字节解码为 RawGrid
// 支持: CSV (.csv) / Excel (.xlsx/.xls) / OpenDocument (.ods)
// 约束: 只做忠实解码，不过滤空行，不做 trim
// ==========================================

use crate::domain::roster::RawGrid;
use crate::domain::types::SpreadsheetFormat;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::roster_importer_trait::FileParser;
use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// 默认文件大小上限（5 MB）
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];
const SNIFF_LINES: usize = 10;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 依据前若干非空行猜测分隔符
    ///
    /// 评分: 出现该分隔符的行数优先，其次为总出现次数；平局取逗号。
    /// 表头上方的标题行通常不含分隔符，不会影响结果。
    fn sniff_delimiter(bytes: &[u8]) -> u8 {
        let lines: Vec<&[u8]> = bytes
            .split(|b| *b == b'\n')
            .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
            .take(SNIFF_LINES)
            .collect();

        let score = |candidate: u8| {
            let counts = lines
                .iter()
                .map(|line| line.iter().filter(|b| **b == candidate).count());
            counts.fold((0usize, 0usize), |(hit, total), n| {
                (hit + usize::from(n > 0), total + n)
            })
        };

        let mut best = b',';
        let mut best_score = score(b',');
        for candidate in DELIMITER_CANDIDATES.iter().skip(1) {
            let candidate_score = score(*candidate);
            if candidate_score > best_score {
                best = *candidate;
                best_score = candidate_score;
            }
        }
        best
    }
}

impl FileParser for CsvParser {
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let delimiter = Self::sniff_delimiter(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头行由 HeaderLocator 决定
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        debug!(rows = rows.len(), delimiter = %(delimiter as char).escape_default(), "CSV 解码完成");
        Ok(RawGrid::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    format: SpreadsheetFormat,
}

impl ExcelParser {
    pub fn new(format: SpreadsheetFormat) -> Self {
        Self { format }
    }

    /// 读取第一个 sheet
    fn first_sheet_range<'a, W>(workbook: &mut W) -> ImportResult<Range<Data>>
    where
        W: Reader<Cursor<&'a [u8]>>,
        W::Error: std::fmt::Display,
    {
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .ok_or_else(|| ImportError::ParseError("工作簿无工作表".to_string()))?;

        workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ImportError::ParseError(format!("读取工作表 {} 失败: {}", sheet_name, e)))
    }

    /// Range 只覆盖已用区域，这里补回前导空行/空列，使行号与表格一致
    fn range_to_grid(range: &Range<Data>) -> RawGrid {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut cells = vec![String::new(); col_offset];
            cells.extend(data_row.iter().map(|cell| cell.to_string()));
            rows.push(cells);
        }
        RawGrid::new(rows)
    }
}

impl FileParser for ExcelParser {
    fn parse_to_grid(&self, bytes: &[u8]) -> ImportResult<RawGrid> {
        let cursor = Cursor::new(bytes);

        let range = match self.format {
            SpreadsheetFormat::Xlsx => {
                let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;
                Self::first_sheet_range(&mut workbook)?
            }
            SpreadsheetFormat::Xls => {
                let mut workbook: Xls<_> = Xls::new(cursor)?;
                Self::first_sheet_range(&mut workbook)?
            }
            SpreadsheetFormat::Ods => {
                let mut workbook: Ods<_> = Ods::new(cursor)?;
                Self::first_sheet_range(&mut workbook)?
            }
            SpreadsheetFormat::Csv => {
                return Err(ImportError::InternalError(
                    "ExcelParser 不处理 CSV".to_string(),
                ))
            }
        };

        let grid = Self::range_to_grid(&range);
        debug!(rows = grid.len(), cols = grid.width(), format = %self.format, "工作簿解码完成");
        Ok(grid)
    }
}

// ==========================================
// 通用文件解析器（解析前检查 + 按格式分派）
// ==========================================
pub struct UniversalFileParser {
    max_file_size_bytes: u64,
    accepted_formats: Vec<SpreadsheetFormat>,
}

impl Default for UniversalFileParser {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE_BYTES,
            vec![
                SpreadsheetFormat::Csv,
                SpreadsheetFormat::Xlsx,
                SpreadsheetFormat::Xls,
                SpreadsheetFormat::Ods,
            ],
        )
    }
}

impl UniversalFileParser {
    pub fn new(max_file_size_bytes: u64, accepted_formats: Vec<SpreadsheetFormat>) -> Self {
        Self {
            max_file_size_bytes,
            accepted_formats,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// 识别格式: hint 可以是扩展名、文件名或 MIME 类型
    pub fn detect_format(&self, hint: &str) -> ImportResult<SpreadsheetFormat> {
        let format = SpreadsheetFormat::from_mime(hint)
            .or_else(|| {
                Path::new(hint.trim())
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(SpreadsheetFormat::from_extension)
            })
            .or_else(|| SpreadsheetFormat::from_extension(hint))
            .ok_or_else(|| ImportError::UnsupportedFormat(hint.trim().to_string()))?;

        if !self.accepted_formats.contains(&format) {
            return Err(ImportError::UnsupportedFormat(format.to_string()));
        }
        Ok(format)
    }

    /// 文件名扩展名优先于 MIME（浏览器常把 CSV 报成 application/vnd.ms-excel）
    pub fn detect_format_from(
        &self,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> ImportResult<SpreadsheetFormat> {
        let by_name = file_name
            .and_then(|n| Path::new(n.trim()).extension())
            .and_then(|e| e.to_str())
            .and_then(SpreadsheetFormat::from_extension);

        match (by_name, mime_type) {
            (Some(format), _) => self.detect_format(format.extension()),
            (None, Some(mime)) => self.detect_format(mime),
            (None, None) => Err(ImportError::UnsupportedFormat(
                file_name.unwrap_or("<未知>").to_string(),
            )),
        }
    }

    /// 大小检查
    pub fn check_size(&self, size: u64) -> ImportResult<()> {
        if size > self.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// 按已识别格式解码（调用方负责先完成解析前检查）
    pub fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> ImportResult<RawGrid> {
        match format {
            SpreadsheetFormat::Csv => CsvParser.parse_to_grid(bytes),
            workbook => ExcelParser::new(workbook).parse_to_grid(bytes),
        }
    }

    /// 解析字节: 先格式/大小检查，再解码
    pub fn parse(&self, bytes: &[u8], extension_or_mime: &str) -> ImportResult<RawGrid> {
        let format = self.detect_format(extension_or_mime)?;
        self.check_size(bytes.len() as u64)?;
        self.decode(bytes, format)
    }

    /// 从磁盘读取并解析（以路径扩展名识别格式，先查大小再读内容）
    pub fn parse_path<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawGrid> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let format = self.detect_format(&path.display().to_string())?;
        self.check_size(std::fs::metadata(path)?.len())?;

        let bytes = std::fs::read(path)?;
        self.decode(&bytes, format)
    }
}
