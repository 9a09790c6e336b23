//! Row Extractor Module
//!
//! データ領域の各行について主キーを検証し、階級ラベルに対応する列の値を取り出すモジュール。

use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::api::{AssetLayout, IncomeLayout};
use crate::error::SkipReason;
use crate::grid::Grid;
use crate::range::{to_half_width, RangeParser};
use crate::types::{Cell, ColumnLabel, DataRow, IncomeRangeRecord, BLANK};

/// 1行分のセルからデータ行を取り出す
///
/// # 引数
///
/// * `row` - 行のセル列（主キー・副キー列は前方補完済みであること）
/// * `labels` - 列位置付きの階級ラベル
/// * `layout` - 主キー・副キー列の位置
/// * `group_key_pattern` - 主キーの受理パターン（例: `^\d+歳代`）
///
/// # 戻り値
///
/// * `Ok(DataRow)` - 1つ以上の階級値を解釈できた場合
/// * `Err(SkipReason::GroupKeyMismatch)` - 主キーがパターンに一致しない場合
/// * `Err(SkipReason::NoNumericCells)` - 解釈できる階級値が1つもない場合
pub fn extract_row(
    row: &[Cell],
    labels: &[ColumnLabel],
    layout: &AssetLayout,
    group_key_pattern: &Regex,
) -> Result<DataRow, SkipReason> {
    let cell_at = |col: usize| row.get(col).unwrap_or(&BLANK);

    let group_key = cell_at(layout.group_key_col).clean_text();
    if !group_key_pattern.is_match(&group_key) {
        return Err(SkipReason::GroupKeyMismatch(group_key));
    }

    let secondary_key = cell_at(layout.secondary_key_col).clean_text();

    let buckets: Vec<_> = labels
        .iter()
        .filter_map(|column| match cell_at(column.col).as_f64() {
            Some(value) => Some((column.label.clone(), value)),
            None => {
                debug!(col = column.col, group_key = %group_key, "non-numeric bucket value skipped");
                None
            }
        })
        .collect();

    if buckets.is_empty() {
        return Err(SkipReason::NoNumericCells);
    }

    Ok(DataRow {
        group_key,
        secondary_key,
        buckets,
    })
}

/// データ領域のすべての行からデータ行を取り出す
///
/// 行ごとの抽出は並列に実行されますが、結果は入力の行順を維持します。
/// スキップされた行はデバッグログに記録されます。
pub fn extract_rows(
    grid: &Grid,
    labels: &[ColumnLabel],
    layout: &AssetLayout,
    group_key_pattern: &Regex,
) -> Vec<DataRow> {
    let start = layout.data_start_row.min(grid.rows());
    let results: Vec<(usize, Result<DataRow, SkipReason>)> = (start..grid.rows())
        .into_par_iter()
        .map(|row_idx| {
            let result = extract_row(grid.row(row_idx), labels, layout, group_key_pattern);
            (row_idx, result)
        })
        .collect();

    results
        .into_iter()
        .filter_map(|(row_idx, result)| match result {
            Ok(row) => Some(row),
            Err(reason) => {
                debug!(row = row_idx, %reason, "row skipped");
                None
            }
        })
        .collect()
}

/// 度数セルを整数として解釈する
///
/// 桁区切りのカンマを許容し、小数部は切り捨てます。解釈できない場合は0です。
fn parse_count(cell: &Cell) -> i64 {
    let value = match cell {
        Cell::Text(s) => Cell::Text(s.replace(',', "")).as_f64(),
        other => other.as_f64(),
    };
    value.map(|v| v.trunc() as i64).unwrap_or(0)
}

/// 収入階級別度数表の各行を取り出す
///
/// `layout.skip_rows`行を読み飛ばした後、収入階級ラベル列を整形（前後の空白除去・NFKC）し、
/// 下限・上限・中央値を求めます。年齢層列の値は整数として解釈し、解釈できない値は0とします。
/// ラベルが空の行（空行・末尾の注記の空き行）は除外します。
pub fn extract_income_rows(
    grid: &Grid,
    layout: &IncomeLayout,
    parser: &RangeParser,
) -> Vec<IncomeRangeRecord> {
    let start = layout.skip_rows.min(grid.rows());

    (start..grid.rows())
        .into_par_iter()
        .filter_map(|row_idx| {
            let label = to_half_width(grid.get(row_idx, layout.label_col).to_text().trim());
            if label.is_empty() {
                debug!(row = row_idx, "blank income label skipped");
                return None;
            }

            let counts = (0..layout.group_names.len())
                .map(|i| parse_count(grid.get(row_idx, layout.first_group_col + i)))
                .collect();

            Some(IncomeRangeRecord {
                range: parser.parse(&label),
                label,
                counts,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BucketLabel;

    fn pattern() -> Regex {
        Regex::new(r"^\d+歳代").unwrap()
    }

    fn labels() -> Vec<ColumnLabel> {
        vec![
            ColumnLabel {
                col: 2,
                label: BucketLabel::new("非保有", Some(0), Some(0)),
            },
            ColumnLabel {
                col: 3,
                label: BucketLabel::new("100万円以上", Some(100), None),
            },
        ]
    }

    fn layout() -> AssetLayout {
        AssetLayout {
            first_bucket_col: 2,
            data_start_row: 0,
            ..AssetLayout::default()
        }
    }

    #[test]
    fn test_extract_valid_row() {
        let row = vec![
            Cell::from("30歳代"),
            Cell::from("300～500万円未満"),
            Cell::Number(40.0),
            Cell::from("60.0%"),
        ];

        let data = extract_row(&row, &labels(), &layout(), &pattern()).unwrap();
        assert_eq!(data.group_key, "30歳代");
        assert_eq!(data.secondary_key, "300～500万円未満");
        assert_eq!(data.buckets.len(), 2);
        assert_eq!(data.buckets[0].1, 40.0);
        assert_eq!(data.buckets[1].1, 60.0);
    }

    #[test]
    fn test_group_key_mismatch() {
        let row = vec![Cell::from("ABC"), Cell::Blank, Cell::Number(1.0)];
        assert_eq!(
            extract_row(&row, &labels(), &layout(), &pattern()),
            Err(SkipReason::GroupKeyMismatch("ABC".to_string()))
        );
    }

    #[test]
    fn test_group_key_is_cleaned() {
        let row = vec![Cell::from(" 40歳代\n"), Cell::Blank, Cell::Number(1.0)];
        let data = extract_row(&row, &labels(), &layout(), &pattern()).unwrap();
        assert_eq!(data.group_key, "40歳代");
    }

    #[test]
    fn test_non_numeric_bucket_is_skipped() {
        let row = vec![
            Cell::from("20歳代"),
            Cell::Blank,
            Cell::from("-"),
            Cell::Number(5.0),
        ];

        let data = extract_row(&row, &labels(), &layout(), &pattern()).unwrap();
        assert_eq!(data.buckets.len(), 1);
        assert_eq!(data.buckets[0].0.min, Some(100));
    }

    #[test]
    fn test_row_without_numbers() {
        let row = vec![Cell::from("20歳代"), Cell::Blank, Cell::from("*")];
        assert_eq!(
            extract_row(&row, &labels(), &layout(), &pattern()),
            Err(SkipReason::NoNumericCells)
        );
    }

    #[test]
    fn test_extract_rows_preserves_order() {
        let grid = Grid::from_rows(vec![
            vec![Cell::from("20歳代"), Cell::from("a"), Cell::Number(1.0)],
            vec![Cell::from("注記"), Cell::Blank, Cell::Number(2.0)],
            vec![Cell::from("30歳代"), Cell::from("b"), Cell::Number(3.0)],
            vec![Cell::from("40歳代"), Cell::from("c"), Cell::Number(4.0)],
        ]);

        let rows = extract_rows(&grid, &labels(), &layout(), &pattern());
        let keys: Vec<&str> = rows.iter().map(|r| r.group_key.as_str()).collect();
        assert_eq!(keys, vec!["20歳代", "30歳代", "40歳代"]);
    }

    fn income_layout() -> IncomeLayout {
        IncomeLayout {
            skip_rows: 1,
            group_names: vec!["29歳以下".to_string(), "30〜34歳".to_string()],
            ..IncomeLayout::default()
        }
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&Cell::Number(12.0)), 12);
        assert_eq!(parse_count(&Cell::from("1,234")), 1234);
        assert_eq!(parse_count(&Cell::from("12.9")), 12);
        assert_eq!(parse_count(&Cell::from("-")), 0);
        assert_eq!(parse_count(&Cell::Blank), 0);
    }

    #[test]
    fn test_extract_income_rows() {
        let grid = Grid::from_rows(vec![
            vec![Cell::from("収入階級"), Cell::from("総数")],
            vec![Cell::from(" １００万円未満 "), Cell::from("30"), Cell::from("10"), Cell::from("20")],
            vec![Cell::Blank, Cell::Blank],
            vec![Cell::from("１５００万円以上"), Cell::from("5"), Cell::from("x"), Cell::from("5")],
        ]);

        let parser = RangeParser::new().unwrap();
        let records = extract_income_rows(&grid, &income_layout(), &parser);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].label, "100万円未満");
        assert_eq!(records[0].range.low, Some(0));
        assert_eq!(records[0].range.high, Some(100));
        assert_eq!(records[0].counts, vec![10, 20]);

        assert_eq!(records[1].label, "1500万円以上");
        assert_eq!(records[1].range.mid, Some(1500));
        assert_eq!(records[1].counts, vec![0, 5]);
    }
}
