use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use surveyjson::{
    AssetLayout, ConverterBuilder, IncomeLayout, InputFormat, LabelErrorPolicy, Pipeline,
    SheetSelector, TextEncoding, ValueMode, DEFAULT_GROUP_KEY_PATTERN,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "surveyjson",
    version,
    about = "Convert survey spreadsheets (Excel/CSV) into JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Asset holding distribution table -> list of normalized records
    Assets(AssetsArgs),
    /// Income class frequency table -> object keyed by age group
    Income(IncomeArgs),
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Input spreadsheet (.xlsx/.xls/.xlsb/.ods/.csv)
    input: PathBuf,

    /// Output JSON path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input format (inferred from the file extension when omitted)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Sheet name (Excel only)
    #[arg(long, conflicts_with = "sheet_index")]
    sheet: Option<String>,

    /// Sheet index, 0-based (Excel only)
    #[arg(long, default_value_t = 0)]
    sheet_index: usize,

    /// Field delimiter (CSV only)
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

#[derive(Args, Debug, Clone)]
struct AssetsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Text encoding (CSV only)
    #[arg(long, value_enum, default_value_t = EncodingArg::Utf8)]
    encoding: EncodingArg,

    /// First of the four header label rows, 0-based
    #[arg(long, default_value_t = 4)]
    label_row: usize,

    /// First bucket column, 0-based
    #[arg(long, default_value_t = 3)]
    first_bucket_col: usize,

    /// First data row, 0-based
    #[arg(long, default_value_t = 10)]
    data_start_row: usize,

    #[arg(long, default_value_t = 0)]
    group_key_col: usize,

    #[arg(long, default_value_t = 1)]
    secondary_key_col: usize,

    /// Regex a row's group key must match
    #[arg(long, default_value = DEFAULT_GROUP_KEY_PATTERN)]
    group_key_pattern: String,

    #[arg(long, value_enum, default_value_t = LabelErrorArg::Skip)]
    on_label_error: LabelErrorArg,

    #[arg(long, value_enum, default_value_t = ValuesArg::Percent)]
    values: ValuesArg,
}

#[derive(Args, Debug, Clone)]
struct IncomeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Text encoding (CSV only)
    #[arg(long, value_enum, default_value_t = EncodingArg::ShiftJis)]
    encoding: EncodingArg,

    /// Leading rows to skip
    #[arg(long, default_value_t = 6)]
    skip_rows: usize,

    #[arg(long, default_value_t = 0)]
    label_col: usize,

    /// Total column; only checked for overlap with the group columns
    #[arg(long, default_value_t = 1, conflicts_with = "no_total_col")]
    total_col: usize,

    /// The table has no total column
    #[arg(long, default_value_t = false, conflicts_with = "total_col")]
    no_total_col: bool,

    #[arg(long, default_value_t = 2)]
    first_group_col: usize,

    /// Age group names in column order (repeat the flag; defaults to the nine standard groups)
    #[arg(long = "group-name")]
    group_names: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum FormatArg {
    Excel,
    Csv,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum EncodingArg {
    Utf8,
    ShiftJis,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LabelErrorArg {
    Skip,
    Abort,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ValuesArg {
    Percent,
    Counts,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Assets(args) => run_assets(args),
        Commands::Income(args) => run_income(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_assets(args: AssetsArgs) -> Result<()> {
    let layout = AssetLayout {
        label_row: args.label_row,
        first_bucket_col: args.first_bucket_col,
        data_start_row: args.data_start_row,
        group_key_col: args.group_key_col,
        secondary_key_col: args.secondary_key_col,
    };

    let builder = input_builder(&args.input, args.encoding)?
        .with_pipeline(Pipeline::AssetDistribution)
        .with_asset_layout(layout)
        .with_group_key_pattern(&args.group_key_pattern)
        .with_label_error_policy(match args.on_label_error {
            LabelErrorArg::Skip => LabelErrorPolicy::SkipColumn,
            LabelErrorArg::Abort => LabelErrorPolicy::Abort,
        })
        .with_value_mode(match args.values {
            ValuesArg::Percent => ValueMode::Percent,
            ValuesArg::Counts => ValueMode::Counts,
        });

    convert(builder, &args.input)
}

fn run_income(args: IncomeArgs) -> Result<()> {
    let mut layout = IncomeLayout {
        skip_rows: args.skip_rows,
        label_col: args.label_col,
        total_col: (!args.no_total_col).then_some(args.total_col),
        first_group_col: args.first_group_col,
        ..IncomeLayout::default()
    };
    if !args.group_names.is_empty() {
        layout.group_names = args.group_names;
    }

    let builder = input_builder(&args.input, args.encoding)?
        .with_pipeline(Pipeline::IncomeClass)
        .with_income_layout(layout);

    convert(builder, &args.input)
}

fn input_builder(args: &InputArgs, encoding: EncodingArg) -> Result<ConverterBuilder> {
    let format = match args.format {
        Some(FormatArg::Excel) => InputFormat::Excel,
        Some(FormatArg::Csv) => InputFormat::Csv,
        None => infer_format(&args.input)?,
    };

    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {:?}", args.delimiter);
    }

    let sheet = match &args.sheet {
        Some(name) => SheetSelector::Name(name.clone()),
        None => SheetSelector::Index(args.sheet_index),
    };

    Ok(ConverterBuilder::new()
        .with_input_format(format)
        .with_sheet_selector(sheet)
        .with_delimiter(args.delimiter as u8)
        .with_encoding(match encoding {
            EncodingArg::Utf8 => TextEncoding::Utf8,
            EncodingArg::ShiftJis => TextEncoding::ShiftJis,
        }))
}

fn infer_format(path: &Path) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    InputFormat::from_extension(ext).with_context(|| {
        format!(
            "cannot infer input format from {}; pass --format",
            path.display()
        )
    })
}

fn convert(builder: ConverterBuilder, args: &InputArgs) -> Result<()> {
    let converter = builder.build().context("invalid converter settings")?;

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let json = converter
        .convert_to_string(input)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(input = %args.input.display(), output = %path.display(), "conversion complete");
        }
        None => print!("{}", json),
    }

    Ok(())
}
