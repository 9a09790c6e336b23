//! Loader Module
//!
//! 入力バイト列（Excelブック・区切りテキスト）を[`Grid`](crate::grid::Grid)に変換するモジュール。
//! ファイル形式の解析はcalamine・csvクレートに委ね、ここではセル値の正規化のみを行います。

mod delimited;
mod workbook;

pub use delimited::load_csv_grid;
pub use workbook::load_excel_grid;
