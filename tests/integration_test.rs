//! Integration Tests for surveyjson
//!
//! Survey workbooks are generated in memory with rust_xlsxwriter and run
//! through the full `Converter` pipeline.

use rust_xlsxwriter::*;
use serde_json::{json, Value};
use std::io::Cursor;
use surveyjson::{
    ConverterBuilder, Document, IncomeLayout, InputFormat, LabelErrorPolicy, Pipeline,
    SheetSelector, SurveyToJsonError, TextEncoding, ValueMode,
};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Write the four header fragment rows (rows 4..=7) starting at column 3
    fn write_header(worksheet: &mut Worksheet, columns: &[[&str; 4]]) -> Result<(), XlsxError> {
        for (i, fragments) in columns.iter().enumerate() {
            let col = 3 + i as u16;
            for (offset, fragment) in fragments.iter().enumerate() {
                if !fragment.is_empty() {
                    worksheet.write_string(4 + offset as u32, col, *fragment)?;
                }
            }
        }
        Ok(())
    }

    /// Write a data row: group key, secondary key, then bucket values from column 3
    fn write_row(
        worksheet: &mut Worksheet,
        row: u32,
        group_key: &str,
        secondary_key: &str,
        values: &[f64],
    ) -> Result<(), XlsxError> {
        if !group_key.is_empty() {
            worksheet.write_string(row, 0, group_key)?;
        }
        worksheet.write_string(row, 1, secondary_key)?;
        for (i, value) in values.iter().enumerate() {
            worksheet.write_number(row, 3 + i as u16, *value)?;
        }
        Ok(())
    }

    /// Asset distribution table with the standard layout
    ///
    /// Buckets: 非保有 / 1～100万円未満 / 100万円以上 / 無回答
    pub fn generate_asset_table() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("資産")?;

        worksheet.write_string(0, 0, "表1 金融資産保有額")?;
        worksheet.write_string(2, 0, "（単位：%）")?;

        // 非保有 spans all four header rows
        worksheet.merge_range(4, 3, 7, 3, "非保有", &Format::new())?;
        write_header(
            worksheet,
            &[
                ["", "", "", ""],
                ["1", "～", "100", "万円未満"],
                ["100", "", "万円", "以上"],
            ],
        )?;
        worksheet.merge_range(4, 6, 7, 6, "無回答", &Format::new())?;

        write_row(worksheet, 10, "20歳代", "全体", &[10.0, 60.0, 30.0, 5.0])?;
        // Group key left blank as in a vertically merged cell
        write_row(worksheet, 11, "", "300万円未満", &[20.0, 20.0, 40.0, 0.0])?;
        write_row(worksheet, 12, "ABC", "全体", &[1.0, 1.0, 1.0, 1.0])?;
        write_row(worksheet, 13, "30歳代", "全体", &[0.0, 0.0, 0.0, 100.0])?;

        worksheet.write_string(14, 0, "30歳代")?;
        worksheet.write_string(14, 1, "300～500万円")?;
        for col in 3..7 {
            worksheet.write_string(14, col, "-")?;
        }

        write_row(worksheet, 15, "40歳代", "全体", &[1.0, 1.0, 2.0, 0.0])?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Table whose second bucket header is not a number
    pub fn generate_broken_header() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        write_header(
            worksheet,
            &[
                ["非保有", "", "", ""],
                ["abc", "～", "x", "万円未満"],
                ["100", "", "万円", "以上"],
            ],
        )?;
        write_row(worksheet, 10, "50歳代", "全体", &[20.0, 99.0, 80.0])?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Table with data rows but no header band
    pub fn generate_headerless() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_row(worksheet, 10, "20歳代", "全体", &[1.0, 2.0, 3.0])?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Income class table as Shift_JIS CSV
    pub fn generate_income_csv() -> Vec<u8> {
        let mut text = String::new();
        for i in 0..6 {
            text.push_str(&format!("注記{}\n", i));
        }
        text.push_str("100万円未満,30,1,2,3,4,5,6,7,8,9\n");
        text.push_str("１００～１９９万円,12,\"1,200\",x,3\n");
        text.push_str(",,,\n");
        text.push_str("1500万円以上,5,0,0,0,0,0,0,0,0,5\n");

        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(&text);
        encoded.into_owned()
    }
}

fn convert_assets(data: Vec<u8>) -> Result<Value, SurveyToJsonError> {
    let converter = ConverterBuilder::new().build()?;
    let json = converter.convert_to_string(Cursor::new(data))?;
    Ok(serde_json::from_str(&json)?)
}

#[test]
fn test_asset_distribution_end_to_end() {
    let data = fixtures::generate_asset_table().unwrap();
    let value = convert_assets(data).unwrap();

    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(
        records[0],
        json!({
            "ageRange": "20歳代",
            "incomeRange": "全体",
            "assetGroups": [
                { "min": 0, "max": 0, "percent": 10.0 },
                { "min": 1, "max": 99, "percent": 60.0 },
                { "min": 100, "max": null, "percent": 30.0 }
            ]
        })
    );
}

#[test]
fn test_merged_group_key_is_filled_down() {
    let value = convert_assets(fixtures::generate_asset_table().unwrap()).unwrap();
    let record = &value[1];

    assert_eq!(record["ageRange"], "20歳代");
    assert_eq!(record["incomeRange"], "300万円未満");
    assert_eq!(record["assetGroups"][0]["percent"], 25.0);
    assert_eq!(record["assetGroups"][2]["percent"], 50.0);
}

#[test]
fn test_rows_without_matching_group_key_are_excluded() {
    let value = convert_assets(fixtures::generate_asset_table().unwrap()).unwrap();
    let keys: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["ageRange"].as_str().unwrap())
        .collect();

    assert!(!keys.contains(&"ABC"));
}

#[test]
fn test_degenerate_and_non_numeric_rows_are_absent() {
    let value = convert_assets(fixtures::generate_asset_table().unwrap()).unwrap();
    let records = value.as_array().unwrap();

    // 30歳代 rows: all-zero distribution and "-" cells
    assert!(records.iter().all(|r| r["ageRange"] != "30歳代"));
    assert_eq!(records[2]["ageRange"], "40歳代");
}

#[test]
fn test_percentages_sum_to_hundred() {
    let value = convert_assets(fixtures::generate_asset_table().unwrap()).unwrap();

    for record in value.as_array().unwrap() {
        let groups = record["assetGroups"].as_array().unwrap();
        let sum: f64 = groups.iter().map(|g| g["percent"].as_f64().unwrap()).sum();
        assert!((sum - 100.0).abs() <= 0.05 * groups.len() as f64, "sum = {}", sum);
    }
}

#[test]
fn test_counts_mode_keeps_raw_values() {
    let converter = ConverterBuilder::new()
        .with_value_mode(ValueMode::Counts)
        .build()
        .unwrap();
    let data = fixtures::generate_asset_table().unwrap();

    match converter.convert_to_document(Cursor::new(data)).unwrap() {
        Document::Records(records) => {
            let values: Vec<f64> = records[0].asset_groups.iter().map(|e| e.percent).collect();
            assert_eq!(values, vec![10.0, 60.0, 30.0]);
        }
        other => panic!("Expected records, got {:?}", other),
    }
}

#[test]
fn test_sheet_selection_by_name() {
    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("資産".to_string()))
        .build()
        .unwrap();
    let data = fixtures::generate_asset_table().unwrap();

    let document = converter.convert_to_document(Cursor::new(data)).unwrap();
    assert_eq!(document.len(), 3);
}

#[test]
fn test_missing_sheet_is_config_error() {
    let data = fixtures::generate_asset_table().unwrap();

    let by_name = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("存在しない".to_string()))
        .build()
        .unwrap()
        .convert_to_document(Cursor::new(data.clone()));
    assert!(matches!(by_name, Err(SurveyToJsonError::Config(_))));

    let by_index = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(5))
        .build()
        .unwrap()
        .convert_to_document(Cursor::new(data));
    match by_index {
        Err(SurveyToJsonError::Config(msg)) => assert!(msg.contains("out of range")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_broken_header_column_is_skipped() {
    let value = convert_assets(fixtures::generate_broken_header().unwrap()).unwrap();

    assert_eq!(
        value,
        json!([{
            "ageRange": "50歳代",
            "incomeRange": "全体",
            "assetGroups": [
                { "min": 0, "max": 0, "percent": 20.0 },
                { "min": 100, "max": null, "percent": 80.0 }
            ]
        }])
    );
}

#[test]
fn test_broken_header_with_abort_policy() {
    let converter = ConverterBuilder::new()
        .with_label_error_policy(LabelErrorPolicy::Abort)
        .build()
        .unwrap();
    let data = fixtures::generate_broken_header().unwrap();

    match converter.convert_to_document(Cursor::new(data)) {
        Err(SurveyToJsonError::LabelParse { column, .. }) => assert_eq!(column, 4),
        other => panic!("Expected LabelParse error, got {:?}", other),
    }
}

#[test]
fn test_headerless_table_is_rejected() {
    let result = convert_assets(fixtures::generate_headerless().unwrap());
    assert!(matches!(
        result,
        Err(SurveyToJsonError::NoLabelsFound {
            first_row: 4,
            last_row: 7
        })
    ));
}

#[test]
fn test_income_class_csv_end_to_end() {
    let converter = ConverterBuilder::new()
        .with_pipeline(Pipeline::IncomeClass)
        .with_input_format(InputFormat::Csv)
        .with_encoding(TextEncoding::ShiftJis)
        .build()
        .unwrap();

    let json = converter
        .convert_to_string(Cursor::new(fixtures::generate_income_csv()))
        .unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), IncomeLayout::DEFAULT_GROUP_NAMES.len());

    assert_eq!(
        value["29歳以下"],
        json!([
            { "収入階級": "100万円未満", "low": 0, "high": 100, "mid": 50, "count": 1 },
            { "収入階級": "100~199万円", "low": 100, "high": 199, "mid": 149, "count": 1200 },
            { "収入階級": "1500万円以上", "low": 1500, "high": null, "mid": 1500, "count": 0 }
        ])
    );

    // Non-numeric and missing counts become 0
    assert_eq!(value["30〜34歳"][1]["count"], 0);
    assert_eq!(value["40〜44歳"][1]["count"], 0);
    assert_eq!(value["65歳以上"][2]["count"], 5);
}

#[test]
fn test_income_class_key_order_follows_group_names() {
    let converter = ConverterBuilder::new()
        .with_pipeline(Pipeline::IncomeClass)
        .with_input_format(InputFormat::Csv)
        .with_encoding(TextEncoding::ShiftJis)
        .build()
        .unwrap();

    let json = converter
        .convert_to_string(Cursor::new(fixtures::generate_income_csv()))
        .unwrap();

    let positions: Vec<usize> = IncomeLayout::DEFAULT_GROUP_NAMES
        .iter()
        .map(|name| json.find(&format!("\"{}\"", name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("assets.xlsx");
    let output_path = dir.path().join("assets.json");
    std::fs::write(&input_path, fixtures::generate_asset_table().unwrap()).unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let input = std::fs::File::open(&input_path).unwrap();
    let output = std::fs::File::create(&output_path).unwrap();
    converter.convert(input, output).unwrap();

    let text = std::fs::read_to_string(&output_path).unwrap();
    assert!(text.ends_with("]\n"));
    assert!(text.contains("\"ageRange\": \"20歳代\""));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 3);
}
