//! Output Module
//!
//! 変換結果のドキュメント型と、JSONへの書き出しを提供するモジュール。

mod assemble;

use serde::Serialize;
use std::io::Write;

use crate::error::SurveyToJsonError;

pub use assemble::{
    assemble_keyed, assemble_records, DistributionRecord, IncomeClassEntry, KeyedDocument,
};

/// 変換結果のドキュメント
///
/// パイプラインに応じて、レコードのリストまたは年齢層をキーとするオブジェクトになります。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// 資産保有額分布: 行ごとのレコードのリスト
    Records(Vec<DistributionRecord>),

    /// 収入階級別度数: 年齢層名 → 行ごとのエントリ
    Keyed(KeyedDocument),
}

impl Document {
    /// レコード（または年齢層）の数
    pub fn len(&self) -> usize {
        match self {
            Document::Records(records) => records.len(),
            Document::Keyed(keyed) => keyed.groups.len(),
        }
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ドキュメントをJSONとして書き出す
///
/// UTF-8・2スペースインデントで出力し、非ASCII文字はエスケープしません。
/// キーと配列の順序は構築時の順序を維持します。
pub fn write_json<W: Write>(document: &Document, writer: &mut W) -> Result<(), SurveyToJsonError> {
    serde_json::to_writer_pretty(&mut *writer, document)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
