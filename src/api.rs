//! Public API Types
//!
//! 公開APIで使用する列挙型とレイアウト設定を定義するモジュール。

/// 変換パイプラインの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Pipeline {
    /// 資産保有額分布（デフォルト）
    ///
    /// 4行の見出し断片から階級ラベルをデコードし、各データ行の割合を
    /// 合計100になるよう正規化します。出力はレコードのリストです。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [
    ///   {
    ///     "ageRange": "30歳代",
    ///     "incomeRange": "300～500万円未満",
    ///     "assetGroups": [
    ///       { "min": 0, "max": 0, "percent": 10.0 },
    ///       { "min": 100, "max": null, "percent": 90.0 }
    ///     ]
    ///   }
    /// ]
    /// ```
    AssetDistribution,

    /// 収入階級別度数
    ///
    /// 先頭列の収入階級文字列から下限・上限・中央値を求め、
    /// 年齢層列ごとのリストにまとめます。
    ///
    /// # 出力例
    ///
    /// ```json
    /// {
    ///   "30〜34歳": [
    ///     { "収入階級": "100〜199万円", "low": 100, "high": 199, "mid": 149, "count": 12 }
    ///   ]
    /// }
    /// ```
    IncomeClass,
}

/// 入力ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputFormat {
    /// Excelブック（xlsx / xls / xlsb / ods、calamineが自動判別）
    Excel,

    /// 区切りテキスト（CSV）
    Csv,
}

impl InputFormat {
    /// ファイル拡張子から入力形式を推定する
    ///
    /// 大文字小文字は区別しません。未知の拡張子は`None`を返します。
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(InputFormat::Excel),
            "csv" | "txt" | "tsv" => Some(InputFormat::Csv),
            _ => None,
        }
    }
}

/// シート選択方式
///
/// 変換対象のシートを1枚選択します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり、デフォルトは最初のシート）
    Index(usize),

    /// シート名指定
    Name(String),
}

/// CSVの文字エンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TextEncoding {
    /// UTF-8（BOM付きも可）
    Utf8,

    /// Shift_JIS（政府統計のCSVで一般的）
    ShiftJis,
}

/// 見出しラベルの数値解釈に失敗した列の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LabelErrorPolicy {
    /// 警告を出してその列をスキップ（デフォルト）
    SkipColumn,

    /// 変換全体を中断
    Abort,
}

/// 行の値の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueMode {
    /// 割合として扱い、合計100に再スケール（デフォルト）
    Percent,

    /// 度数として扱い、無回答の除外のみ行う
    Counts,
}

/// 資産保有額分布表のレイアウト（0始まりの行・列インデックス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    /// 見出し断片4行の先頭行
    pub label_row: usize,

    /// 階級列の先頭列
    pub first_bucket_col: usize,

    /// データ本体の先頭行
    pub data_start_row: usize,

    /// 主キー（年齢層）列
    pub group_key_col: usize,

    /// 副キー（年収階級）列
    pub secondary_key_col: usize,
}

impl AssetLayout {
    /// 見出し断片の行数
    pub const LABEL_ROWS: usize = 4;

    /// 見出し領域の最終行
    pub fn last_label_row(&self) -> usize {
        self.label_row + Self::LABEL_ROWS - 1
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            label_row: 4,
            first_bucket_col: 3,
            data_start_row: 10,
            group_key_col: 0,
            secondary_key_col: 1,
        }
    }
}

/// 収入階級別度数表のレイアウト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeLayout {
    /// 読み飛ばす先頭行数
    pub skip_rows: usize,

    /// 収入階級ラベル列
    pub label_col: usize,

    /// 総数列の位置（`build()`での重なり検証にのみ使用）
    ///
    /// 出力される列は`first_group_col`から`group_names.len()`列分だけなので、
    /// 総数列はこの範囲の外に置くことで出力から外れます。
    pub total_col: Option<usize>,

    /// 年齢層列の先頭列
    pub first_group_col: usize,

    /// 年齢層の名前（列順）
    pub group_names: Vec<String>,
}

impl IncomeLayout {
    /// 既定の年齢層名
    pub const DEFAULT_GROUP_NAMES: [&'static str; 9] = [
        "29歳以下",
        "30〜34歳",
        "35〜39歳",
        "40〜44歳",
        "45〜49歳",
        "50〜54歳",
        "55〜59歳",
        "60〜64歳",
        "65歳以上",
    ];
}

impl Default for IncomeLayout {
    fn default() -> Self {
        Self {
            skip_rows: 6,
            label_col: 0,
            total_col: Some(1),
            first_group_col: 2,
            group_names: Self::DEFAULT_GROUP_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}
