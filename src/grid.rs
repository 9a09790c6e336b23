//! Grid Module
//!
//! 読み込んだセルを稠密な2次元グリッドとして保持し、
//! 結合セルの表示を解決するための前方補完（forward-fill）を提供するモジュール。

use std::ops::Range;

use crate::types::{Cell, BLANK};

/// 稠密な2次元グリッド（行 × 列）
///
/// 行ごとの長さは揃っていなくても構いません。範囲外の座標は空セルとして扱います。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    /// グリッドデータ
    cells: Vec<Vec<Cell>>,

    /// 最大列数
    cols: usize,
}

impl Grid {
    /// 行データからグリッドを構築
    pub fn from_rows(cells: Vec<Vec<Cell>>) -> Self {
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        Self { cells, cols }
    }

    /// 行数
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// 列数（最長の行に合わせる）
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// セルの総数（行数 × 列数）
    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols
    }

    /// 指定座標のセルを取得（範囲外は空セル）
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }

    /// 指定行のセル列を取得（範囲外は空スライス）
    pub fn row(&self, row: usize) -> &[Cell] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 下方向の前方補完を適用した新しいグリッドを返す
    ///
    /// `rows`の範囲内で、`cols`に含まれる各列の空セルを、同じ範囲内で
    /// 直前（上方向）にある最も近い非空セルの値で埋めます。
    /// 範囲より上の値は引き継ぎません。元のグリッドは変更しません。
    ///
    /// # 引数
    ///
    /// * `rows` - 補完対象の行範囲
    /// * `cols` - 補完対象の列範囲（グリッド幅で切り詰め）
    pub fn fill_down(&self, rows: Range<usize>, cols: Range<usize>) -> Grid {
        let mut cells = self.cells.clone();
        let row_end = rows.end.min(cells.len());
        let col_end = cols.end.min(self.cols);

        for col in cols.start..col_end {
            let mut carry: Option<Cell> = None;

            for row in rows.start..row_end {
                let line = &mut cells[row];
                if line.len() <= col {
                    line.resize(col + 1, Cell::Blank);
                }

                if line[col].is_blank() {
                    if let Some(value) = &carry {
                        line[col] = value.clone();
                    }
                } else {
                    carry = Some(line[col].clone());
                }
            }
        }

        Grid {
            cells,
            cols: self.cols,
        }
    }
}
