//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型と、行・セル単位のスキップ理由を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// surveyjsonクレート全体で使用するエラー型
///
/// 変換処理を中断させる致命的なエラーのみを表します。
/// 行単位・セル単位の問題は[`SkipReason`]としてローカルに吸収され、
/// このエラー型には現れません。
///
/// # エラーの種類
///
/// - `Io`: 入出力の失敗
/// - `Parse`: ワークブックの解析失敗（calamine由来）
/// - `Csv`: 区切りテキストの解析失敗（csv由来）
/// - `Json`: JSONシリアライズの失敗
/// - `Config`: 設定の検証失敗
/// - `LabelParse`: 見出しラベルの数値部分が解釈できない（`LabelErrorPolicy::Abort`時のみ致命的）
/// - `NoLabelsFound`: 有効な階級ラベルが1つも得られなかった
/// - `SecurityViolation`: 入力サイズ制限違反
///
/// # 使用例
///
/// ```rust,no_run
/// use surveyjson::SurveyToJsonError;
/// use std::fs::File;
///
/// fn open_survey(path: &str) -> Result<File, SurveyToJsonError> {
///     let file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum SurveyToJsonError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVの解析中に発生したエラー
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// JSONの書き出し中に発生したエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、グループキーの正規表現が不正な場合や、
    /// 見出し行がデータ開始行より後ろにある場合などです。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use surveyjson::{ConverterBuilder, SurveyToJsonError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_group_key_pattern("(")
    ///     .build();
    ///
    /// match result {
    ///     Err(SurveyToJsonError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 見出しラベルの数値部分を解釈できなかったエラー
    #[error("Failed to decode header label at column {column}: {message}")]
    LabelParse {
        /// ラベルの列インデックス（0始まり）
        column: usize,
        /// エラーの詳細
        message: String,
    },

    /// 有効な階級ラベルが1つも見つからなかったエラー
    #[error("No usable bucket labels found in header rows {first_row}..={last_row}")]
    NoLabelsFound {
        /// 見出し領域の先頭行
        first_row: usize,
        /// 見出し領域の最終行
        last_row: usize,
    },

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// 見出しラベル1件のデコード失敗
///
/// ラベル規則（範囲・未満・以上）には一致したが、数値部分が整数として
/// 解釈できなかった場合に返されます。呼び出し側は列をスキップするか、
/// [`SurveyToJsonError::LabelParse`]に変換して変換全体を中断するかを選べます。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("label '{text}': fragment '{fragment}' is not an integer")]
pub struct LabelParseError {
    /// 連結済みのラベル文字列
    pub text: String,
    /// 整数として解釈できなかった断片
    pub fragment: String,
}

/// 行またはセルが出力から除外された理由
///
/// いずれもエラーではなく、処理は継続されます。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// グループキーが受理パターンに一致しない（見出し行・注記行など）
    #[error("group key '{0}' does not match the accepted pattern")]
    GroupKeyMismatch(String),

    /// 行内に数値として解釈できるセルが1つもない
    #[error("no numeric bucket values in row")]
    NoNumericCells,

    /// 無回答を除いた合計が0（または有限でない）ため正規化できない
    #[error("bucket values sum to {total} after excluding no-answer buckets")]
    DegenerateDistribution {
        /// 除外後の合計値
        total: f64,
    },
}
