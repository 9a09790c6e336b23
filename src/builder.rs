//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use crate::api::{
    AssetLayout, IncomeLayout, InputFormat, LabelErrorPolicy, Pipeline, SheetSelector,
    TextEncoding, ValueMode,
};
use crate::error::SurveyToJsonError;
use crate::grid::Grid;
use crate::output::{Document, KeyedDocument};
use crate::range::RangeParser;
use crate::security::SecurityConfig;
use regex::Regex;
use std::collections::HashSet;
use std::io::{Read, Write};
use tracing::info;

/// 年齢層（`20歳代`など）の既定の受理パターン
pub const DEFAULT_GROUP_KEY_PATTERN: &str = r"^\d+歳代";

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 変換パイプライン
    pub pipeline: Pipeline,

    /// 入力形式
    pub input_format: InputFormat,

    /// シート選択方式（Excelのみ）
    pub sheet_selector: SheetSelector,

    /// 文字エンコーディング（CSVのみ）
    pub encoding: TextEncoding,

    /// 区切り文字（CSVのみ）
    pub delimiter: u8,

    /// 資産保有額分布表のレイアウト
    pub asset_layout: AssetLayout,

    /// 主キーの受理パターン
    pub group_key_pattern: String,

    /// 見出しラベルの解釈失敗時の扱い
    pub label_error_policy: LabelErrorPolicy,

    /// 行の値の扱い
    pub value_mode: ValueMode,

    /// 収入階級別度数表のレイアウト
    pub income_layout: IncomeLayout,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pipeline: Pipeline::AssetDistribution,
            input_format: InputFormat::Excel,
            sheet_selector: SheetSelector::Index(0),
            encoding: TextEncoding::Utf8,
            delimiter: b',',
            asset_layout: AssetLayout::default(),
            group_key_pattern: DEFAULT_GROUP_KEY_PATTERN.to_string(),
            label_error_policy: LabelErrorPolicy::SkipColumn,
            value_mode: ValueMode::Percent,
            income_layout: IncomeLayout::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use surveyjson::{ConverterBuilder, InputFormat, Pipeline, TextEncoding};
///
/// # fn main() -> Result<(), surveyjson::SurveyToJsonError> {
/// let converter = ConverterBuilder::new()
///     .with_pipeline(Pipeline::IncomeClass)
///     .with_input_format(InputFormat::Csv)
///     .with_encoding(TextEncoding::ShiftJis)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - パイプライン: 資産保有額分布
    /// - 入力形式: Excel（最初のシート）
    /// - 見出し: 5〜8行目、4列目以降（0始まりで行4〜7、列3〜）
    /// - データ: 11行目以降（0始まりで行10〜）
    /// - 主キー: `^\d+歳代`
    /// - 見出しラベルの解釈失敗: 列をスキップ
    /// - 値: 割合として合計100に正規化
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換パイプラインを指定する
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.config.pipeline = pipeline;
        self
    }

    /// 入力形式を指定する
    pub fn with_input_format(mut self, format: InputFormat) -> Self {
        self.config.input_format = format;
        self
    }

    /// 変換対象のシートを選択する（Excelのみ）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use surveyjson::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("表1".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// CSVの文字エンコーディングを指定する
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// CSVの区切り文字を指定する
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// 資産保有額分布表のレイアウトを指定する
    pub fn with_asset_layout(mut self, layout: AssetLayout) -> Self {
        self.config.asset_layout = layout;
        self
    }

    /// 主キーの受理パターン（正規表現）を指定する
    ///
    /// 不正な正規表現は`build()`時に`SurveyToJsonError::Config`になります。
    pub fn with_group_key_pattern(mut self, pattern: &str) -> Self {
        self.config.group_key_pattern = pattern.to_string();
        self
    }

    /// 見出しラベルの解釈に失敗した列の扱いを指定する
    pub fn with_label_error_policy(mut self, policy: LabelErrorPolicy) -> Self {
        self.config.label_error_policy = policy;
        self
    }

    /// 行の値の扱い（割合・度数）を指定する
    pub fn with_value_mode(mut self, mode: ValueMode) -> Self {
        self.config.value_mode = mode;
        self
    }

    /// 収入階級別度数表のレイアウトを指定する
    pub fn with_income_layout(mut self, layout: IncomeLayout) -> Self {
        self.config.income_layout = layout;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SurveyToJsonError::Config(String)`: 設定の検証に失敗した場合
    ///   * 主キーの正規表現が不正
    ///   * 見出し行がデータ開始行と重なる
    ///   * 主キー・副キー列が階級列の範囲に含まれる
    ///   * 年齢層名が空または重複している
    ///   * 収入階級ラベル列・総数列が年齢層列と重なる
    ///   * 区切り文字が改行・引用符
    pub fn build(self) -> Result<Converter, SurveyToJsonError> {
        // 1. 主キーパターンのコンパイル
        let group_key_pattern = Regex::new(&self.config.group_key_pattern).map_err(|e| {
            SurveyToJsonError::Config(format!(
                "Invalid group key pattern '{}': {}",
                self.config.group_key_pattern, e
            ))
        })?;

        // 2. 資産保有額分布表レイアウトの検証
        let asset = &self.config.asset_layout;
        if asset.last_label_row() >= asset.data_start_row {
            return Err(SurveyToJsonError::Config(format!(
                "Invalid layout: label rows {}..={} overlap data start row {}",
                asset.label_row,
                asset.last_label_row(),
                asset.data_start_row
            )));
        }
        for (name, col) in [
            ("group key", asset.group_key_col),
            ("secondary key", asset.secondary_key_col),
        ] {
            if col >= asset.first_bucket_col {
                return Err(SurveyToJsonError::Config(format!(
                    "Invalid layout: {} column {} must precede first bucket column {}",
                    name, col, asset.first_bucket_col
                )));
            }
        }

        // 3. 収入階級別度数表レイアウトの検証
        let income = &self.config.income_layout;
        if income.group_names.is_empty() {
            return Err(SurveyToJsonError::Config(
                "Invalid layout: at least one group column name is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = income.group_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(SurveyToJsonError::Config(format!(
                "Invalid layout: duplicate group column name '{}'",
                duplicate
            )));
        }
        let group_cols = income.first_group_col..income.first_group_col + income.group_names.len();
        if group_cols.contains(&income.label_col) {
            return Err(SurveyToJsonError::Config(format!(
                "Invalid layout: label column {} overlaps group columns {:?}",
                income.label_col, group_cols
            )));
        }
        if let Some(total_col) = income.total_col {
            if group_cols.contains(&total_col) {
                return Err(SurveyToJsonError::Config(format!(
                    "Invalid layout: total column {} overlaps group columns {:?}",
                    total_col, group_cols
                )));
            }
        }

        // 4. 区切り文字の検証
        if matches!(self.config.delimiter, b'\n' | b'\r' | b'"') {
            return Err(SurveyToJsonError::Config(format!(
                "Invalid delimiter: {:?}",
                self.config.delimiter as char
            )));
        }

        // 5. Converterインスタンス生成
        Ok(Converter {
            range_parser: RangeParser::new()?,
            group_key_pattern,
            security: SecurityConfig::default(),
            config: self.config,
        })
    }
}

/// 変換処理のファサード
///
/// 調査表（Excel/CSV）をJSONに変換するためのメインエントリーポイントです。
/// `ConverterBuilder`を使用して構築された設定に基づいて変換処理を実行します。
///
/// # 使用例
///
/// ```rust,no_run
/// use surveyjson::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), surveyjson::SurveyToJsonError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("assets.xlsx")?;
/// let output = File::create("assets.json")?;
/// converter.convert(input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// コンパイル済みの主キーパターン
    group_key_pattern: Regex,

    /// 収入階級パーサー
    range_parser: RangeParser,

    /// 入力サイズ制限
    security: SecurityConfig,
}

impl Converter {
    /// 入力を読み込んでJSONとして書き出す
    ///
    /// ドキュメント全体をメモリ上で組み立ててから書き出すため、
    /// 致命的なエラーが発生した場合は`output`に何も書き込まれません。
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込む（サイズ制限を検証）
    /// 2. 入力形式に応じてグリッドを構築
    /// 3. パイプラインに応じてドキュメントを組み立て
    /// 4. JSONをバッファに書き出してから`output`へ転送
    pub fn convert<R: Read, W: Write>(&self, input: R, mut output: W) -> Result<(), SurveyToJsonError> {
        let document = self.convert_to_document(input)?;

        let mut buffer = Vec::new();
        crate::output::write_json(&document, &mut buffer)?;

        output.write_all(&buffer)?;
        output.flush()?;
        Ok(())
    }

    /// 入力をJSON文字列に変換する
    pub fn convert_to_string<R: Read>(&self, input: R) -> Result<String, SurveyToJsonError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;

        let result = String::from_utf8(buffer).map_err(|e| {
            SurveyToJsonError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(result)
    }

    /// 入力を読み込んでドキュメントを組み立てる
    pub fn convert_to_document<R: Read>(&self, mut input: R) -> Result<Document, SurveyToJsonError> {
        let mut buffer = Vec::new();
        let bytes_read = input.read_to_end(&mut buffer)?;
        self.security.check_input_size(bytes_read)?;

        let grid = match self.config.input_format {
            InputFormat::Excel => {
                crate::loader::load_excel_grid(buffer, &self.config.sheet_selector)?
            }
            InputFormat::Csv => crate::loader::load_csv_grid(
                &buffer,
                self.config.encoding,
                self.config.delimiter,
            )?,
        };
        self.security.check_grid(&grid)?;

        self.convert_grid(&grid)
    }

    /// 読み込み済みのグリッドからドキュメントを組み立てる
    ///
    /// 前方補完はこのメソッド内で1度だけ適用されます。
    pub fn convert_grid(&self, grid: &Grid) -> Result<Document, SurveyToJsonError> {
        match self.config.pipeline {
            Pipeline::AssetDistribution => self.convert_asset_distribution(grid),
            Pipeline::IncomeClass => Ok(Document::Keyed(self.convert_income_class(grid))),
        }
    }

    fn convert_asset_distribution(&self, grid: &Grid) -> Result<Document, SurveyToJsonError> {
        let layout = &self.config.asset_layout;

        // 結合セルの見出しと、主キー・副キー列を下方向に補完する
        let grid = grid
            .fill_down(
                layout.label_row..layout.last_label_row() + 1,
                layout.first_bucket_col..grid.cols(),
            )
            .fill_down(
                layout.data_start_row..grid.rows(),
                layout.group_key_col..layout.group_key_col + 1,
            )
            .fill_down(
                layout.data_start_row..grid.rows(),
                layout.secondary_key_col..layout.secondary_key_col + 1,
            );

        let labels =
            crate::label::decode_header(&grid, layout, self.config.label_error_policy)?;
        let rows = crate::extract::extract_rows(&grid, &labels, layout, &self.group_key_pattern);
        let extracted = rows.len();
        let records = crate::output::assemble_records(rows, self.config.value_mode);

        info!(
            labels = labels.len(),
            rows = extracted,
            records = records.len(),
            "converted asset distribution table"
        );
        Ok(Document::Records(records))
    }

    fn convert_income_class(&self, grid: &Grid) -> KeyedDocument {
        let layout = &self.config.income_layout;
        let records = crate::extract::extract_income_rows(grid, layout, &self.range_parser);
        let document = crate::output::assemble_keyed(&records, &layout.group_names);

        info!(
            rows = records.len(),
            groups = document.groups.len(),
            "converted income class table"
        );
        document
    }
}
