//! Security Module
//!
//! 入力サイズの上限を定義し、巨大な入力によるメモリ枯渇を防ぐモジュール。

use crate::error::SurveyToJsonError;
use crate::grid::Grid;

/// セキュリティ設定
///
/// 入力ファイル処理時のサイズ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 512MB (536_870_912 bytes)
    pub max_input_file_size: u64,
    /// グリッドの最大セル数（行数 × 列数）
    /// デフォルト: 50_000_000
    pub max_grid_cells: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 536_870_912, // 512MB
            max_grid_cells: 50_000_000,
        }
    }
}

impl SecurityConfig {
    /// 読み込んだバイト数が上限以内かを検証
    pub fn check_input_size(&self, bytes_read: usize) -> Result<(), SurveyToJsonError> {
        if bytes_read as u64 > self.max_input_file_size {
            return Err(SurveyToJsonError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// グリッドのセル数が上限以内かを検証
    pub fn check_grid(&self, grid: &Grid) -> Result<(), SurveyToJsonError> {
        let cells = grid.cell_count();
        if cells > self.max_grid_cells {
            return Err(SurveyToJsonError::SecurityViolation(format!(
                "Grid size exceeds maximum: {} cells ({} x {}, max: {} cells)",
                cells,
                grid.rows(),
                grid.cols(),
                self.max_grid_cells
            )));
        }
        Ok(())
    }
}
