//! surveyjson - Survey spreadsheet (Excel/CSV) to JSON converter
//!
//! This crate converts statistical survey tables into JSON. Bucket labels split
//! across several header rows (for example `1` / `～` / `100` / `万円未満`) are
//! decoded into numeric ranges, each data row is normalized into a distribution
//! summing to 100, and income class strings such as `100～199万円` are turned
//! into low / high / mid bounds.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use surveyjson::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Asset distribution table with the default layout
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("assets.xlsx")?;
//!     let output = File::create("assets.json")?;
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Income Class Tables (Shift_JIS CSV)
//!
//! ```rust,no_run
//! use std::fs::File;
//! use surveyjson::{ConverterBuilder, InputFormat, Pipeline, TextEncoding};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_pipeline(Pipeline::IncomeClass)
//!         .with_input_format(InputFormat::Csv)
//!         .with_encoding(TextEncoding::ShiftJis)
//!         .build()?;
//!
//!     let json = converter.convert_to_string(File::open("income.csv")?)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Building Blocks
//!
//! The individual stages are public as well:
//!
//! ```rust
//! use surveyjson::{decode_label, RangeParser};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let label = decode_label(["1", "～", "100", "万円未満"])?;
//! assert_eq!((label.min, label.max), (Some(1), Some(99)));
//!
//! let range = RangeParser::new()?.parse("１００～１９９万円");
//! assert_eq!(range.mid, Some(149));
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod extract;
mod grid;
mod label;
mod loader;
mod normalize;
mod output;
mod range;
mod security;
mod types;

// 公開API
pub use api::{
    AssetLayout, IncomeLayout, InputFormat, LabelErrorPolicy, Pipeline, SheetSelector,
    TextEncoding, ValueMode,
};
pub use builder::{Converter, ConverterBuilder, DEFAULT_GROUP_KEY_PATTERN};
pub use error::{LabelParseError, SkipReason, SurveyToJsonError};

// 変換の各段階
pub use extract::{extract_income_rows, extract_row, extract_rows};
pub use grid::Grid;
pub use label::{decode_header, decode_label};
pub use loader::{load_csv_grid, load_excel_grid};
pub use normalize::normalize_distribution;
pub use output::{
    assemble_keyed, assemble_records, write_json, DistributionRecord, Document,
    IncomeClassEntry, KeyedDocument,
};
pub use range::{to_half_width, RangeParser};
pub use types::{
    BucketLabel, Cell, ColumnLabel, DataRow, DistributionEntry, IncomeRange, IncomeRangeRecord,
};
