//! The decoded model output and its projection onto rows and columns.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Column used when a row has no field names of its own.
pub const SCALAR_COLUMN: &str = "value";

/// Whatever JSON the model handed back, sorted by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    /// A single JSON object.
    Single(Record),
    /// An array in which every element is an object.
    Multi(Vec<Record>),
    /// Valid JSON of any other shape.
    Malformed(Value),
}

impl From<Value> for ExtractionResult {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(record) => ExtractionResult::Single(record),
            Value::Array(items) if items.iter().all(Value::is_object) => ExtractionResult::Multi(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(record),
                        _ => None,
                    })
                    .collect(),
            ),
            other => ExtractionResult::Malformed(other),
        }
    }
}

impl ExtractionResult {
    pub fn to_value(&self) -> Value {
        match self {
            ExtractionResult::Single(record) => Value::Object(record.clone()),
            ExtractionResult::Multi(records) => {
                Value::Array(records.iter().cloned().map(Value::Object).collect())
            }
            ExtractionResult::Malformed(value) => value.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionResult::Single(_) => "single",
            ExtractionResult::Multi(_) => "multi",
            ExtractionResult::Malformed(_) => "malformed",
        }
    }

    /// One record per spreadsheet row. Scalars and non-object array elements
    /// are wrapped as `{"value": ...}`.
    pub fn rows(&self) -> Vec<Record> {
        match self {
            ExtractionResult::Single(record) => vec![record.clone()],
            ExtractionResult::Multi(records) => records.clone(),
            ExtractionResult::Malformed(Value::Array(items)) => {
                items.iter().map(wrap_row).collect()
            }
            ExtractionResult::Malformed(value) => vec![wrap_row(value)],
        }
    }

    pub fn table(&self) -> Table {
        Table::from_rows(&self.rows())
    }
}

fn wrap_row(value: &Value) -> Record {
    match value {
        Value::Object(record) => record.clone(),
        other => {
            let mut record = Record::new();
            record.insert(SCALAR_COLUMN.to_string(), other.clone());
            record
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(n.to_string())),
            Value::String(s) => Cell::Text(s.clone()),
            nested => Cell::Text(nested.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Rectangular view of a result: columns in first-seen order, absent
/// fields left empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_rows(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(Cell::from).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }
}
