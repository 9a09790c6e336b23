//! Result Assembler
//!
//! 抽出・正規化済みの行から出力ドキュメントの構造を組み立てる。

use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::api::ValueMode;
use crate::normalize::normalize_distribution;
use crate::types::{DataRow, DistributionEntry, IncomeRangeRecord};

/// 資産保有額分布の1行分のレコード
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRecord {
    /// 主キー（年齢層）
    pub age_range: String,
    /// 副キー（年収階級）
    pub income_range: String,
    /// 正規化済みの分布
    pub asset_groups: Vec<DistributionEntry>,
}

/// 収入階級別度数の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IncomeClassEntry {
    /// 元の収入階級ラベル
    #[serde(rename = "収入階級")]
    pub label: String,
    pub low: Option<i64>,
    pub high: Option<i64>,
    pub mid: Option<i64>,
    pub count: i64,
}

/// 年齢層名をキーとする順序付きドキュメント
///
/// JSONオブジェクトとして書き出され、キーの順序は`groups`の順序に従います。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyedDocument {
    pub groups: Vec<(String, Vec<IncomeClassEntry>)>,
}

impl KeyedDocument {
    /// 指定した年齢層のエントリを取得
    pub fn get(&self, key: &str) -> Option<&[IncomeClassEntry]> {
        self.groups
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, entries)| entries.as_slice())
    }
}

impl Serialize for KeyedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, entries) in &self.groups {
            map.serialize_entry(name, entries)?;
        }
        map.end()
    }
}

/// データ行を正規化し、レコードのリストを組み立てる
///
/// 正規化できない行（合計0など）は警告を記録して除外します。
/// 出力の順序は入力の行順を維持します。
pub fn assemble_records(rows: Vec<DataRow>, mode: ValueMode) -> Vec<DistributionRecord> {
    let normalized: Vec<_> = rows
        .into_par_iter()
        .map(|row| {
            let result = normalize_distribution(&row.buckets, mode);
            (row, result)
        })
        .collect();

    normalized
        .into_iter()
        .filter_map(|(row, result)| match result {
            Ok(asset_groups) => Some(DistributionRecord {
                age_range: row.group_key,
                income_range: row.secondary_key,
                asset_groups,
            }),
            Err(reason) => {
                warn!(
                    age_range = %row.group_key,
                    income_range = %row.secondary_key,
                    %reason,
                    "row dropped"
                );
                None
            }
        })
        .collect()
}

/// 収入階級レコードを年齢層ごとのリストに組み替える
///
/// 年齢層ごとに、すべての行のエントリを行順に並べます。
/// 行の度数が年齢層数より少ない場合、不足分は0とします。
pub fn assemble_keyed(records: &[IncomeRangeRecord], group_names: &[String]) -> KeyedDocument {
    let groups = group_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let entries = records
                .iter()
                .map(|record| IncomeClassEntry {
                    label: record.label.clone(),
                    low: record.range.low,
                    high: record.range.high,
                    mid: record.range.mid,
                    count: record.counts.get(i).copied().unwrap_or(0),
                })
                .collect();
            (name.clone(), entries)
        })
        .collect();

    KeyedDocument { groups }
}
