//! Distribution Normalizer Module
//!
//! 1行分の階級値から無回答階級を除外し、割合の合計が100になるよう再スケールするモジュール。

use crate::api::ValueMode;
use crate::error::SkipReason;
use crate::types::{BucketLabel, DistributionEntry};

/// 小数第1位で四捨五入する
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 1行分の階級値を正規化する
///
/// 1. `min`と`max`が両方`None`の階級（無回答）を除外する（分母からも除外される）
/// 2. 残りの値の合計を求める
/// 3. `ValueMode::Percent`の場合、各値を `round(value / total * 100, 1)` に置き換える
///
/// 出力の順序は入力の列順を維持します。
///
/// # 戻り値
///
/// * `Ok(Vec<DistributionEntry>)` - 正規化済みの分布
/// * `Err(SkipReason::DegenerateDistribution)` - 除外後の合計が0または有限でない場合
///
/// # 使用例
///
/// ```rust
/// use surveyjson::{normalize_distribution, BucketLabel, ValueMode};
///
/// let buckets = vec![
///     (BucketLabel::new("非保有", Some(0), Some(0)), 1.0),
///     (BucketLabel::new("100万円以上", Some(100), None), 3.0),
///     (BucketLabel::new("無回答", None, None), 5.0),
/// ];
/// let distribution = normalize_distribution(&buckets, ValueMode::Percent).unwrap();
/// assert_eq!(distribution[0].percent, 25.0);
/// assert_eq!(distribution[1].percent, 75.0);
/// ```
pub fn normalize_distribution(
    buckets: &[(BucketLabel, f64)],
    mode: ValueMode,
) -> Result<Vec<DistributionEntry>, SkipReason> {
    let valid: Vec<&(BucketLabel, f64)> = buckets
        .iter()
        .filter(|(label, _)| label.is_numeric())
        .collect();

    let total: f64 = valid.iter().map(|(_, value)| value).sum();
    if total == 0.0 || !total.is_finite() {
        return Err(SkipReason::DegenerateDistribution { total });
    }

    let entries = valid
        .into_iter()
        .map(|(label, value)| DistributionEntry {
            min: label.min,
            max: label.max,
            percent: match mode {
                ValueMode::Percent => round1(value / total * 100.0),
                ValueMode::Counts => *value,
            },
        })
        .collect();

    Ok(entries)
}
