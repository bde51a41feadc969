// ==========================================
// 学员名册导入系统 - 表头定位器
// ==========================================
// 阶段 2: 在网格中找到真正的表头行（容忍上方的标题/装饰行）
// 判定: 同一行内至少一个名字别名 且 至少一个姓氏别名
// ==========================================

use crate::domain::roster::{ColumnIndexMap, HeaderLocation, RawGrid};
use crate::domain::types::CanonicalField;
use crate::importer::error::{ImportError, ImportResult};
use tracing::debug;

/// 定位表头行并构建列映射
///
/// # 规则
/// 1. 从第 0 行向下扫描，首个满足名字+姓氏条件的行即表头
/// 2. 其余字段在该行内逐个匹配，首个匹配列胜出；已被认领的列不再分配
/// 3. 未匹配的字段记为缺失，不使整个文件失败
///
/// # 错误
/// - HeaderNotFound: 没有任何行满足名字+姓氏条件
pub fn locate(grid: &RawGrid) -> ImportResult<HeaderLocation> {
    for (row_idx, row) in grid.rows().iter().enumerate() {
        if let Some(column_map) = build_column_map(row) {
            debug!(
                header_row_index = row_idx,
                resolved = column_map.resolved_fields().count(),
                "表头定位完成"
            );
            return Ok(HeaderLocation {
                header_row_index: row_idx,
                column_map,
            });
        }
    }

    Err(ImportError::HeaderNotFound)
}

/// 若该行满足表头条件，返回其列映射
fn build_column_map(row: &[String]) -> Option<ColumnIndexMap> {
    let mut map = ColumnIndexMap::default();

    for field in CanonicalField::ALL {
        let column = row
            .iter()
            .enumerate()
            .find(|(col, cell)| !map.is_claimed(*col) && field.matches_header(cell.trim()))
            .map(|(col, _)| col);

        match column {
            Some(col) => map = map.with(field, col),
            // 名字、姓氏是前两个字段，缺任一即可判定不是表头行
            None if matches!(field, CanonicalField::FirstName | CanonicalField::LastName) => {
                return None
            }
            None => {}
        }
    }

    Some(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_locate_first_row() {
        let g = grid(&[&["First Name", "Last Name", "Gender"], &["Jo", "Soap", "F"]]);
        let location = locate(&g).unwrap();

        assert_eq!(location.header_row_index, 0);
        assert_eq!(location.column_map.get(CanonicalField::FirstName), Some(0));
        assert_eq!(location.column_map.get(CanonicalField::LastName), Some(1));
        assert_eq!(location.column_map.get(CanonicalField::Gender), Some(2));
        assert_eq!(location.column_map.get(CanonicalField::Whatsapp), None);
    }

    #[test]
    fn test_locate_skips_decorative_rows() {
        let g = grid(&[
            &["Grade 4 Class List", "", ""],
            &["", "", ""],
            &["Term 1", "First Name", ""],
            &["  learner_first_name ", "SURNAME", "Cell"],
            &["Jo", "Soap", "082 555 1234"],
        ]);
        let location = locate(&g).unwrap();

        // 第 2 行只有名字没有姓氏，不算表头
        assert_eq!(location.header_row_index, 3);
        assert_eq!(location.column_map.get(CanonicalField::CellPhone), Some(2));
    }

    #[test]
    fn test_locate_header_not_found() {
        let g = grid(&[&["Name Only"], &["Jo"]]);
        assert!(matches!(locate(&g), Err(ImportError::HeaderNotFound)));

        let empty = RawGrid::default();
        assert!(matches!(locate(&empty), Err(ImportError::HeaderNotFound)));
    }

    #[test]
    fn test_locate_first_matching_column_wins() {
        let g = grid(&[&["Surname", "First Name", "Mobile", "Cell Phone"]]);
        let map = locate(&g).unwrap().column_map;

        assert_eq!(map.get(CanonicalField::FirstName), Some(1));
        assert_eq!(map.get(CanonicalField::LastName), Some(0));
        assert_eq!(map.get(CanonicalField::CellPhone), Some(2));
    }

    #[test]
    fn test_locate_any_alias_variant() {
        let pairs = [
            ("FIRST NAME", "last_name"),
            ("Given-Name", "Family Name"),
            ("LearnerFirstName", "Learner Surname"),
            ("forename", "PUPIL SURNAME"),
        ];
        for (first, last) in pairs {
            let g = grid(&[&["School Roster"], &["Notes", first, last]]);
            let location = locate(&g).unwrap();
            assert_eq!(location.header_row_index, 1, "{} / {}", first, last);
        }
    }
}
