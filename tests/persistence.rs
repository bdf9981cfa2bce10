use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_web_extractor::extraction::{Cell, ExtractionResult};
use rust_web_extractor::storage::{save_raw, save_structured, MAX_CELL_CHARS};
use serde_json::{json, Value};
use tempfile::TempDir;

const STAMP: &str = "20240315_093000";

fn read_sheet(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

#[tokio::test]
async fn save_raw_creates_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("output").join("runs");

    let path = save_raw("# Title", STAMP, &dir).await.unwrap();

    assert_eq!(path, dir.join("rawData_20240315_093000.md"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title");
}

#[tokio::test]
async fn save_raw_overwrites_same_timestamp() {
    let temp_dir = TempDir::new().unwrap();

    save_raw("first run, longer content", STAMP, temp_dir.path()).await.unwrap();
    save_raw("Price: €1.200", STAMP, temp_dir.path()).await.unwrap();
    let path = save_raw("Price: €1.200", STAMP, temp_dir.path()).await.unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), "Price: €1.200");
}

#[tokio::test]
async fn structured_json_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let value = json!([
        {"Address": "1 Main St", "Price": 500000, "Beds": 3, "Garage": true},
        {"Address": "2 Oak Ave", "Price": null, "Photos": ["a.jpg", "b.jpg"]}
    ]);
    let result = ExtractionResult::from(value.clone());

    let (json_path, _) = save_structured(&result, STAMP, temp_dir.path()).await.unwrap();

    let decoded: Value = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(ExtractionResult::from(decoded), result);
}

#[tokio::test]
async fn single_record_is_written_indented_with_one_row() {
    let temp_dir = TempDir::new().unwrap();
    let result = ExtractionResult::from(json!({"Price": "$500,000"}));

    let (json_path, spreadsheet_path) =
        save_structured(&result, STAMP, temp_dir.path()).await.unwrap();

    assert_eq!(json_path.file_name().unwrap(), "sorted_data_20240315_093000.json");
    assert_eq!(
        std::fs::read_to_string(&json_path).unwrap(),
        "{\n    \"Price\": \"$500,000\"\n}"
    );

    assert_eq!(spreadsheet_path.file_name().unwrap(), "sorted_data_20240315_093000.xlsx");
    let bytes = std::fs::read(&spreadsheet_path).unwrap();
    assert_eq!(&bytes[..4], b"PK\x03\x04");

    let table = result.table();
    assert_eq!(table.columns, vec!["Price"]);
    assert_eq!(table.rows, vec![vec![Cell::Text("$500,000".into())]]);

    assert_eq!(
        read_sheet(&spreadsheet_path),
        vec![vec![text("Price")], vec![text("$500,000")]]
    );
}

#[tokio::test]
async fn spreadsheet_has_one_row_per_record_and_blank_missing_fields() {
    let temp_dir = TempDir::new().unwrap();
    let result = ExtractionResult::from(json!([
        {"Address": "1 Main St", "Price": 500000, "Agent": null},
        {"Address": "2 Oak Ave", "Beds": 3, "Garage": true}
    ]));

    let (_, spreadsheet_path) = save_structured(&result, STAMP, temp_dir.path()).await.unwrap();

    assert_eq!(
        read_sheet(&spreadsheet_path),
        vec![
            vec![text("Address"), text("Price"), text("Agent"), text("Beds"), text("Garage")],
            vec![text("1 Main St"), Data::Float(500000.0), Data::Empty, Data::Empty, Data::Empty],
            vec![text("2 Oak Ave"), Data::Empty, Data::Empty, Data::Float(3.0), Data::Bool(true)],
        ]
    );
}

#[tokio::test]
async fn overlong_text_is_cut_instead_of_failing_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let description = "x".repeat(40_000);
    let result = ExtractionResult::from(json!({"Description": description, "Price": "$1"}));

    let (json_path, spreadsheet_path) =
        save_structured(&result, STAMP, temp_dir.path()).await.unwrap();

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(saved["Description"].as_str().unwrap().len(), 40_000);

    let rows = read_sheet(&spreadsheet_path);
    assert_eq!(rows.len(), 2);
    match &rows[1][0] {
        Data::String(cell) => assert_eq!(cell.chars().count(), MAX_CELL_CHARS),
        other => panic!("expected text cell, got {:?}", other),
    }
    assert_eq!(rows[1][1], text("$1"));
}

#[tokio::test]
async fn scalar_result_still_produces_both_files() {
    let temp_dir = TempDir::new().unwrap();
    let result = ExtractionResult::from(json!("no listing found"));

    let (json_path, spreadsheet_path) =
        save_structured(&result, STAMP, temp_dir.path()).await.unwrap();

    assert_eq!(std::fs::read_to_string(json_path).unwrap(), "\"no listing found\"");
    assert!(spreadsheet_path.exists());
}

#[tokio::test]
async fn unwritable_directory_is_a_filesystem_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let err = save_raw("content", STAMP, &blocker).await.unwrap_err();

    assert!(matches!(err, rust_web_extractor::error::AppError::Io(_)));
}
