// ==========================================
// 名册导入集成测试
// ==========================================
// 测试目标: 验证从文件字节到待确认批次的完整流程
// ==========================================


use roster_import::config::{config_keys, ConfigManager};
use roster_import::domain::{CanonicalField, SpreadsheetFormat, PREVIEW_LIMIT};
use roster_import::importer::{ImportError, RosterImporter, RosterImporterImpl};
use roster_import::logging;
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::{as_slices, csv_bytes, learner_rows, xlsx_bytes, xlsx_workbook_bytes};

// ==========================================
// 测试场景 A: CSV，学员前缀表头
// ==========================================
#[test]
fn test_scenario_a_csv_with_learner_headers() {
    logging::init_test();

    let bytes = csv_bytes(&[
        &["Learner First Name", "Learner Surname", "WhatsApp"],
        &["Jo", "Soap", "+27821234567"],
        &["", "Invalid", "123"],
    ]);

    let preview = RosterImporterImpl::default()
        .process(&bytes, Some("class-list.csv"), Some("text/csv"))
        .unwrap();
    let summary = &preview.summary;

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.valid_rows, 1);
    assert_eq!(summary.invalid_rows, 1);
    assert_eq!(summary.duplicate_rows, 0);

    // 唯一的错误指向第二个数据行（表格第 3 行）
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 3);
    assert!(summary.errors[0].message.contains("firstName"));

    assert_eq!(summary.preview.len(), 1);
    assert_eq!(summary.preview[0].first_name, "Jo");
}

// ==========================================
// 测试场景 B: 工作簿，首行为标题
// ==========================================
#[test]
fn test_scenario_b_workbook_with_title_row() {
    logging::init_test();

    let mut rows: Vec<Vec<String>> = vec![
        vec!["Grade 4 Class List 2024".to_string()],
        vec![
            "First Name".to_string(),
            "Surname".to_string(),
            "Cell Phone".to_string(),
        ],
    ];
    rows.extend(learner_rows(5));
    let slices = as_slices(&rows);
    let refs: Vec<&[&str]> = slices.iter().map(Vec::as_slice).collect();
    let bytes = xlsx_bytes(&refs).unwrap();

    let preview = RosterImporterImpl::default()
        .process(&bytes, Some("Grade4.xlsx"), None)
        .unwrap();

    assert_eq!(preview.format, SpreadsheetFormat::Xlsx);
    assert_eq!(preview.header_row_index, 1);
    assert_eq!(preview.summary.total_rows, 5);
    assert_eq!(preview.summary.valid_rows, 5);
    assert_eq!(preview.summary.invalid_rows, 0);
    assert_eq!(preview.column_map.get(CanonicalField::CellPhone), Some(2));

    // 数据从表格第 3 行开始
    assert_eq!(preview.summary.ready_records[0].row_number, 3);
    assert_eq!(preview.summary.ready_records[0].phone, "+27 82 000 0001");
}

#[test]
fn test_scenario_b_workbook_with_plain_name_headers() {
    let mut rows: Vec<Vec<String>> = vec![
        vec!["Springfield Primary - Grade 4".to_string()],
        vec!["First Name".to_string(), "Last Name".to_string()],
    ];
    rows.extend(
        learner_rows(5)
            .into_iter()
            .map(|row| row.into_iter().take(2).collect::<Vec<_>>()),
    );
    let slices = as_slices(&rows);
    let refs: Vec<&[&str]> = slices.iter().map(Vec::as_slice).collect();
    let bytes = xlsx_bytes(&refs).unwrap();

    let preview = RosterImporterImpl::default()
        .process(&bytes, Some("grade4.xlsx"), None)
        .unwrap();

    assert_eq!(preview.header_row_index, 1);
    assert_eq!(preview.summary.total_rows, 5);
    assert_eq!(preview.summary.valid_rows, 5);
    assert!(preview.summary.errors.is_empty());
}

#[test]
fn test_only_first_sheet_is_read() {
    let first: &[&[&str]] = &[&["First Name", "Last Name"], &["Jo", "Soap"]];
    let second: &[&[&str]] = &[
        &["First Name", "Last Name"],
        &["Ann", "Lee"],
        &["Ben", "Khumalo"],
        &["Cara", "Naidoo"],
        &["Dan", "Smith"],
    ];
    let bytes = xlsx_workbook_bytes(&[first, second]).unwrap();

    let preview = RosterImporterImpl::default()
        .process(&bytes, Some("two-sheets.xlsx"), None)
        .unwrap();

    assert_eq!(preview.summary.total_rows, 1);
    assert_eq!(preview.summary.valid_rows, 1);
    assert_eq!(preview.summary.ready_records[0].first_name, "Jo");
}

#[test]
fn test_semicolon_csv_with_title_row() {
    let bytes = b"Grade 4 Class List\nFirst Name;Last Name\nJo;Soap\n";

    let preview = RosterImporterImpl::default()
        .process(bytes, Some("class.csv"), None)
        .unwrap();

    assert_eq!(preview.header_row_index, 1);
    assert_eq!(preview.summary.valid_rows, 1);
    assert_eq!(preview.summary.ready_records[0].last_name, "Soap");
}

// ==========================================
// 表头识别
// ==========================================
#[test]
fn test_header_variants_are_recognized() {
    let variants = [
        ("first_name", "LAST_NAME"),
        ("FirstName", "lastname"),
        ("  First  Name ", "Last-Name"),
        ("Learner First Name", "Learner Surname"),
        ("given name", "family name"),
    ];

    for (first, last) in variants {
        let bytes = csv_bytes(&[&[first, last], &["Jo", "Soap"]]);
        let preview = RosterImporterImpl::default()
            .process(&bytes, Some("a.csv"), None)
            .unwrap_or_else(|e| panic!("{} / {} 未被识别: {}", first, last, e));

        assert_eq!(preview.header_row_index, 0);
        assert_eq!(preview.summary.valid_rows, 1);
    }
}

#[test]
fn test_header_row_after_decorative_rows() {
    let bytes = csv_bytes(&[
        &["Springfield Primary", "", ""],
        &["Term 1", "", ""],
        &["", "", ""],
        &["Surname", "Forename", "Gender"],
        &["Soap", "Jo", "F"],
    ]);

    let preview = RosterImporterImpl::default()
        .process(&bytes, Some("a.csv"), None)
        .unwrap();

    assert_eq!(preview.header_row_index, 3);
    assert_eq!(preview.column_map.get(CanonicalField::FirstName), Some(1));
    assert_eq!(preview.column_map.get(CanonicalField::LastName), Some(0));
    assert_eq!(preview.summary.ready_records[0].gender, "F");
    assert_eq!(preview.summary.ready_records[0].row_number, 5);
}

#[test]
fn test_missing_last_name_column_rejects_file() {
    let bytes = csv_bytes(&[&["First Name", "Cell Phone"], &["Jo", "082 123 4567"]]);
    let result = RosterImporterImpl::default().process(&bytes, Some("a.csv"), None);

    assert!(matches!(result, Err(ImportError::HeaderNotFound)));
}

// ==========================================
// 行校验
// ==========================================
#[test]
fn test_blank_rows_are_not_counted() {
    let bytes = csv_bytes(&[
        &["First Name", "Last Name"],
        &["Jo", "Soap"],
        &["", ""],
        &["   ", "\t"],
        &["Ann", ""],
    ]);

    let summary = RosterImporterImpl::default()
        .process(&bytes, Some("a.csv"), None)
        .unwrap()
        .summary;

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.valid_rows + summary.invalid_rows, summary.total_rows);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 5);
}

#[test]
fn test_suspicious_phone_warns_without_blocking() {
    let bytes = csv_bytes(&[
        &["First Name", "Last Name", "Phone", "WhatsApp"],
        &["Jo", "Soap", "555-1234-oops", "n/a"],
    ]);

    let summary = RosterImporterImpl::default()
        .process(&bytes, Some("a.csv"), None)
        .unwrap()
        .summary;

    assert_eq!(summary.valid_rows, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.warnings.len(), 2);
    assert_eq!(summary.warnings[0].field, CanonicalField::CellPhone);
    assert_eq!(summary.warnings[1].field, CanonicalField::Whatsapp);
}

#[test]
fn test_phone_falls_back_to_home_and_emergency() {
    let bytes = csv_bytes(&[
        &["First Name", "Last Name", "Tel Home", "Tel Emergency", "Telegram"],
        &["Jo", "Soap", "(H) 011 555 0101", "(E) 083 555 0199", "@jo"],
        &["Ann", "Lee", "", "(E) 083 555 0200", ""],
    ]);

    let records = RosterImporterImpl::default()
        .process(&bytes, Some("a.csv"), None)
        .unwrap()
        .summary
        .ready_records;

    assert_eq!(records[0].phone, "011 555 0101");
    assert_eq!(records[0].tel_emergency, "083 555 0199");
    assert_eq!(records[0].telegram, "@jo");
    assert_eq!(records[1].phone, "083 555 0200");
}

// ==========================================
// 预览与重复执行
// ==========================================
#[test]
fn test_preview_capped_at_three_in_row_order() {
    let mut rows = vec![vec!["First Name".to_string(), "Last Name".to_string(), "Cell".to_string()]];
    rows.extend(learner_rows(10));
    let slices = as_slices(&rows);
    let refs: Vec<&[&str]> = slices.iter().map(Vec::as_slice).collect();

    let summary = RosterImporterImpl::default()
        .process(&csv_bytes(&refs), Some("a.csv"), None)
        .unwrap()
        .summary;

    assert_eq!(summary.valid_rows, 10);
    assert_eq!(summary.preview.len(), PREVIEW_LIMIT);
    let names: Vec<&str> = summary.preview.iter().map(|r| r.first_name.as_str()).collect();
    assert_eq!(names, vec!["Learner1", "Learner2", "Learner3"]);
    assert_eq!(summary.ready_records.len(), 10);
}

#[test]
fn test_processing_same_file_twice_gives_same_summary() {
    let bytes = csv_bytes(&[
        &["Learner First Name", "Learner Surname", "WhatsApp"],
        &["Jo", "Soap", "+27821234567"],
        &["", "Invalid", "abc"],
    ]);
    let importer = RosterImporterImpl::default();

    let first = importer.process(&bytes, Some("a.csv"), None).unwrap();
    let second = importer.process(&bytes, Some("a.csv"), None).unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.column_map, second.column_map);
}

// ==========================================
// 解析前检查
// ==========================================
#[test]
fn test_oversized_file_rejected_before_parsing() {
    let mut config = ConfigManager::new();
    config.set(config_keys::MAX_FILE_SIZE_BYTES, "16");
    let importer = RosterImporterImpl::from_config(&config).unwrap();

    let bytes = csv_bytes(&[&["First Name", "Last Name"], &["Jo", "Soap"]]);
    let result = importer.process(&bytes, Some("a.csv"), None);

    match result {
        Err(ImportError::FileTooLarge { size, limit }) => {
            assert_eq!(size, bytes.len() as u64);
            assert_eq!(limit, 16);
        }
        other => panic!("期望 FileTooLarge，实际: {:?}", other.map(|p| p.batch_id)),
    }
}

#[test]
fn test_unsupported_format_rejected() {
    let result = RosterImporterImpl::default().process(b"%PDF-1.4", Some("roster.pdf"), Some("application/pdf"));
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[test]
fn test_corrupt_workbook_is_parse_error() {
    let result = RosterImporterImpl::default().process(b"not really a zip", Some("roster.xlsx"), None);
    assert!(matches!(result, Err(ImportError::ParseError(_))));
}

#[test]
fn test_process_path_reads_csv_from_disk() {
    let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(temp_file, "First Name;Last Name;Gender").unwrap();
    writeln!(temp_file, "Jo;Soap;M").unwrap();

    let preview = RosterImporterImpl::default()
        .process_path(temp_file.path())
        .unwrap();

    assert_eq!(preview.summary.valid_rows, 1);
    assert_eq!(preview.summary.ready_records[0].gender, "M");
}

#[test]
fn test_process_path_missing_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().with_extension("csv");

    let result = RosterImporterImpl::default().process_path(&path);
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}
