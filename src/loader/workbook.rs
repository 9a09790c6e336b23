//! Workbook Loader
//!
//! calamineを使用してExcelブックの1シートをグリッドとして読み込む。

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;

use crate::api::SheetSelector;
use crate::error::SurveyToJsonError;
use crate::grid::Grid;
use crate::types::Cell;

/// Excelブックから1シートを読み込む
///
/// xlsx / xlsm / xls / xlsb / ods をcalamineが自動判別します。
/// シートの使用範囲がA1から始まらない場合も、行・列インデックスが
/// シート上の絶対位置と一致するよう先頭を空セルで埋めます。
///
/// # 引数
///
/// * `bytes` - ブック全体のバイト列
/// * `selector` - 読み込むシート
///
/// # 戻り値
///
/// * `Ok(Grid)` - シートのグリッド
/// * `Err(SurveyToJsonError::Parse)` - ブックの解析に失敗した場合
/// * `Err(SurveyToJsonError::Config)` - シートが見つからない場合
pub fn load_excel_grid(
    bytes: Vec<u8>,
    selector: &SheetSelector,
) -> Result<Grid, SurveyToJsonError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names().to_vec();

    let sheet_name = match selector {
        SheetSelector::Index(index) => sheet_names.get(*index).cloned().ok_or_else(|| {
            SurveyToJsonError::Config(format!(
                "Sheet index {} is out of range (total: {})",
                index,
                sheet_names.len()
            ))
        })?,
        SheetSelector::Name(name) => {
            if !sheet_names.contains(name) {
                return Err(SurveyToJsonError::Config(format!(
                    "Sheet '{}' not found",
                    name
                )));
            }
            name.clone()
        }
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let (row_offset, col_offset) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));

    let mut rows = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Blank; col_offset];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    let grid = Grid::from_rows(rows);
    debug!(
        sheet = %sheet_name,
        rows = grid.rows(),
        cols = grid.cols(),
        "loaded worksheet"
    );
    Ok(grid)
}

/// calamineのセル値を[`Cell`]に変換する
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        Data::Empty => Cell::Blank,
        // エラー値・シリアル日付は階級値として扱わない
        _ => Cell::Blank,
    }
}
