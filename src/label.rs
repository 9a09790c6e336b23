//! Label Decoder Module
//!
//! 複数行に分かれた見出し断片（例: `100` / `～` / `300` / `万円未満`）から
//! 階級ラベルの数値境界（min, max）をデコードするモジュール。

use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::api::{AssetLayout, LabelErrorPolicy};
use crate::error::{LabelParseError, SurveyToJsonError};
use crate::grid::Grid;
use crate::types::{clean_fragment, BucketLabel, ColumnLabel};

const NO_ANSWER: &str = "無回答";
const NON_HOLDER: &str = "非保有";
const MAN_YEN: &str = "万円";
const LESS_THAN: &str = "未満";
const OR_MORE: &str = "以上";
const RANGE_CONNECTORS: [&str; 3] = ["～", "〜", "~"];

/// 4つの見出し断片から階級ラベルをデコードする
///
/// 各断片は空白類を除去したうえで連結され、ラベルの表示文字列になります。
/// 規則は上から順に評価され、最初に一致したものが採用されます。
///
/// 1. `無回答`を含む → `(text, None, None)`
/// 2. `非保有`を含む → `(text, 0, 0)`
/// 3. 断片2が範囲記号（`～`）で、断片4が`万円`と`未満`を含む → `(text, 断片1, 断片3 - 1)`
/// 4. 断片3が`万円`を含み、断片4が`未満`を含む → `(text, 1, 断片1 - 1)`
/// 5. 断片3が`万円`を含み、断片4が`以上`を含む → `(text, 断片1, None)`
/// 6. それ以外 → `(text, None, None)`
///
/// # 戻り値
///
/// * `Ok(BucketLabel)` - デコード結果
/// * `Err(LabelParseError)` - 規則3〜5に一致したが数値部分が整数でない場合
///
/// # 使用例
///
/// ```rust
/// use surveyjson::decode_label;
///
/// let label = decode_label(["100", "～", "300", "万円未満"]).unwrap();
/// assert_eq!(label.min, Some(100));
/// assert_eq!(label.max, Some(299));
/// ```
pub fn decode_label(fragments: [&str; 4]) -> Result<BucketLabel, LabelParseError> {
    let [f1, f2, f3, f4] = fragments.map(clean_fragment);
    let text = format!("{f1}{f2}{f3}{f4}");

    if text.contains(NO_ANSWER) {
        return Ok(BucketLabel::new(text, None, None));
    }

    if text.contains(NON_HOLDER) {
        return Ok(BucketLabel::new(text, Some(0), Some(0)));
    }

    let parse = |fragment: &str| {
        parse_int(fragment).ok_or_else(|| LabelParseError {
            text: text.clone(),
            fragment: fragment.to_string(),
        })
    };

    // 表示上の上限は「未満」なので、含む上限に直す
    let parse_below = |fragment: &str| {
        parse(fragment)?.checked_sub(1).ok_or_else(|| LabelParseError {
            text: text.clone(),
            fragment: fragment.to_string(),
        })
    };

    if RANGE_CONNECTORS.contains(&f2.as_str()) && f4.contains(MAN_YEN) && f4.contains(LESS_THAN) {
        let min = parse(&f1)?;
        let max = parse_below(&f3)?;
        return Ok(BucketLabel::new(text, Some(min), Some(max)));
    }

    if f3.contains(MAN_YEN) && f4.contains(LESS_THAN) {
        let max = parse_below(&f1)?;
        return Ok(BucketLabel::new(text, Some(1), Some(max)));
    }

    if f3.contains(MAN_YEN) && f4.contains(OR_MORE) {
        let min = parse(&f1)?;
        return Ok(BucketLabel::new(text, Some(min), None));
    }

    Ok(BucketLabel::new(text, None, None))
}

/// 見出し断片を整数として解釈する
///
/// 全角数字と桁区切りのカンマを許容します。
fn parse_int(fragment: &str) -> Option<i64> {
    let normalized: String = fragment
        .nfkc()
        .filter(|c| *c != ',')
        .collect();
    normalized.trim().parse::<i64>().ok()
}

/// グリッドの見出し領域から列ごとの階級ラベルをデコードする
///
/// `layout.first_bucket_col`以降の各列について、`layout.label_row`から4行分の
/// 断片をデコードします。断片がすべて空の列は無視します。
///
/// # 引数
///
/// * `grid` - 前方補完済みのグリッド
/// * `layout` - 表のレイアウト
/// * `policy` - 数値解釈に失敗した列の扱い
///
/// # 戻り値
///
/// * `Ok(Vec<ColumnLabel>)` - 列順のラベル（無回答ラベルを含む）
/// * `Err(SurveyToJsonError::LabelParse)` - `LabelErrorPolicy::Abort`で解釈に失敗した場合
/// * `Err(SurveyToJsonError::NoLabelsFound)` - 数値境界を持つラベルが1つもない場合
pub fn decode_header(
    grid: &Grid,
    layout: &AssetLayout,
    policy: LabelErrorPolicy,
) -> Result<Vec<ColumnLabel>, SurveyToJsonError> {
    let mut labels = Vec::new();

    for col in layout.first_bucket_col..grid.cols() {
        let fragments: Vec<String> = (layout.label_row..=layout.last_label_row())
            .map(|row| grid.get(row, col).clean_text())
            .collect();

        if fragments.iter().all(String::is_empty) {
            continue;
        }

        let decoded = decode_label([
            fragments[0].as_str(),
            fragments[1].as_str(),
            fragments[2].as_str(),
            fragments[3].as_str(),
        ]);

        match decoded {
            Ok(label) => {
                debug!(col, text = %label.text, min = ?label.min, max = ?label.max, "decoded label");
                labels.push(ColumnLabel { col, label });
            }
            Err(e) => match policy {
                LabelErrorPolicy::SkipColumn => {
                    warn!(col, error = %e, "skipping header column");
                }
                LabelErrorPolicy::Abort => {
                    return Err(SurveyToJsonError::LabelParse {
                        column: col,
                        message: e.to_string(),
                    });
                }
            },
        }
    }

    if !labels.iter().any(|c| c.label.is_numeric()) {
        return Err(SurveyToJsonError::NoLabelsFound {
            first_row: layout.label_row,
            last_row: layout.last_label_row(),
        });
    }

    Ok(labels)
}
