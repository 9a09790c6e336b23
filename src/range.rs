//! Range Parser Module
//!
//! 単独の収入階級文字列（例: `200～249万円`、`65歳以上`）から
//! 下限・上限・中央値を求めるモジュール。

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::SurveyToJsonError;
use crate::types::IncomeRange;

/// 全角英数字・記号を半角に正規化する（NFKC）
pub fn to_half_width(text: &str) -> String {
    text.nfkc().collect()
}

/// 収入階級文字列のパーサー
///
/// 数値抽出用の正規表現を1度だけコンパイルし、全行で再利用します。
#[derive(Debug, Clone)]
pub struct RangeParser {
    numbers: Regex,
}

impl RangeParser {
    pub fn new() -> Result<Self, SurveyToJsonError> {
        let numbers = Regex::new(r"[0-9]+")
            .map_err(|e| SurveyToJsonError::Config(format!("Invalid number pattern: {}", e)))?;
        Ok(Self { numbers })
    }

    /// 収入階級文字列を解析する
    ///
    /// 1. `以上`を含む → 下限 = 最初の数値、上限なし
    /// 2. `未満`を含む → 下限 = 0、上限 = 最初の数値
    /// 3. それ以外で数値がちょうど2つ → (下限, 上限)
    /// 4. いずれにも当てはまらない → 下限・上限ともになし
    ///
    /// 中央値は上限がある場合`(下限 + 上限) / 2`（切り捨て）、ない場合は下限です。
    /// `i64`に収まらない数値は数値として数えず、中央値の計算があふれる場合は`None`です。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use surveyjson::RangeParser;
    ///
    /// # fn main() -> Result<(), surveyjson::SurveyToJsonError> {
    /// let range = RangeParser::new()?.parse("30〜34歳");
    /// assert_eq!((range.low, range.high, range.mid), (Some(30), Some(34), Some(32)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(&self, text: &str) -> IncomeRange {
        let text = to_half_width(text);
        let numbers: Vec<i64> = self
            .numbers
            .find_iter(&text)
            .filter_map(|m| m.as_str().parse::<i64>().ok())
            .collect();

        let (low, high) = if text.contains("以上") {
            (numbers.first().copied(), None)
        } else if text.contains("未満") {
            (Some(0), numbers.first().copied())
        } else if let [low, high] = numbers[..] {
            (Some(low), Some(high))
        } else {
            (None, None)
        };

        let mid = match (low, high) {
            (Some(low), Some(high)) => low.checked_add(high).map(|sum| sum.div_euclid(2)),
            (low, _) => low,
        };

        IncomeRange { low, high, mid }
    }
}
