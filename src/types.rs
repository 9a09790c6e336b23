//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;

/// セルの値を表す列挙型
///
/// スプレッドシート・CSVのどちらから読み込んだ場合も、この3種類に正規化されます。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// 空セル
    #[default]
    Blank,

    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),
}

/// 範囲外参照に使う共有の空セル
pub(crate) static BLANK: Cell = Cell::Blank;

impl Cell {
    /// 値が空かどうかを判定
    ///
    /// 空白文字のみの文字列も空として扱います（CSVの空フィールド対策）。
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// 値を表示文字列として取得
    ///
    /// 整数値の数値は小数部なしで出力します（例: `100.0` → `"100"`）。
    pub fn to_text(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    /// 前後の空白・全角スペース・改行を除去した文字列を取得
    pub fn clean_text(&self) -> String {
        clean_fragment(&self.to_text())
    }

    /// 値を数値として取得
    ///
    /// 文字列セルは整形後に末尾の`%`を除去してから解釈します。
    /// 解釈できない場合は`None`を返します。
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Blank => None,
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => {
                let cleaned = clean_fragment(s);
                let stripped = cleaned.strip_suffix('%').unwrap_or(&cleaned);
                stripped
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// 見出し断片・セル文字列から空白類を除去する
///
/// 前後の空白に加え、全角スペース（U+3000）と改行は文字列中のものも除去します。
pub fn clean_fragment(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '\u{3000}' | '\n' | '\r'))
        .collect()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 階級ラベル
///
/// `min`と`max`が両方`None`の場合は非数値（無回答）階級で、分布からは除外されます。
/// `min = 0, max = 0`は明示的な「非保有」階級で、分布に含まれます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLabel {
    /// 見出し断片を連結した表示文字列
    pub text: String,
    /// 下限（含む）
    pub min: Option<i64>,
    /// 上限（含む）
    pub max: Option<i64>,
}

impl BucketLabel {
    pub fn new(text: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            text: text.into(),
            min,
            max,
        }
    }

    /// 数値境界を1つ以上持つか（無回答・解釈不能でないか）
    pub fn is_numeric(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// 列位置付きの階級ラベル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    /// グリッド上の列インデックス（0始まり）
    pub col: usize,
    /// デコード済みラベル
    pub label: BucketLabel,
}

/// 抽出済みのデータ行
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// 主キー（例: `30歳代`）
    pub group_key: String,
    /// 副キー（例: 年収階級）
    pub secondary_key: String,
    /// 列順の (ラベル, 生の値) の並び
    pub buckets: Vec<(BucketLabel, f64)>,
}

/// 正規化済み分布の1要素
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub percent: f64,
}

/// 収入階級の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IncomeRange {
    pub low: Option<i64>,
    pub high: Option<i64>,
    pub mid: Option<i64>,
}

/// 収入階級1行分のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRangeRecord {
    /// 整形済みの収入階級ラベル
    pub label: String,
    pub range: IncomeRange,
    /// 年齢層ごとの度数（列順）
    pub counts: Vec<i64>,
}
