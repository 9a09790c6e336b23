//! Delimited Text Loader
//!
//! 指定した文字エンコーディングでCSVをデコードし、グリッドとして読み込む。

use tracing::{debug, warn};

use crate::api::TextEncoding;
use crate::error::SurveyToJsonError;
use crate::grid::Grid;
use crate::types::Cell;

/// 区切りテキストを読み込む
///
/// エンコーディングは自動判別せず、`encoding`に従ってデコードします。
/// 不正なバイト列は置換文字に置き換え、警告を記録します。
/// 行ごとのフィールド数は揃っていなくても構いません。
/// 空行も空の行として保持するため、行インデックスはファイル上の行位置と一致します。
///
/// # 引数
///
/// * `bytes` - ファイル全体のバイト列
/// * `encoding` - 文字エンコーディング
/// * `delimiter` - 区切り文字（例: `b','`）
pub fn load_csv_grid(
    bytes: &[u8],
    encoding: TextEncoding,
    delimiter: u8,
) -> Result<Grid, SurveyToJsonError> {
    let (text, had_errors) = match encoding {
        TextEncoding::Utf8 => {
            let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
            (text, had_errors)
        }
        TextEncoding::ShiftJis => {
            let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
            (text, had_errors)
        }
    };

    if had_errors {
        warn!(?encoding, "input contains byte sequences invalid for the configured encoding");
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut next_line = 1u64;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(next_line, |pos| pos.line());

        // csvは空行を読み飛ばすので、行番号の差分だけ空行を補う
        while next_line < line {
            rows.push(Vec::new());
            next_line += 1;
        }
        let embedded: u64 = record.iter().map(|f| f.matches('\n').count() as u64).sum();
        next_line = line + 1 + embedded;

        rows.push(record.iter().map(Cell::from).collect());
    }

    let grid = Grid::from_rows(rows);
    debug!(rows = grid.rows(), cols = grid.cols(), "loaded delimited text");
    Ok(grid)
}
