use askama::Template;

use crate::error::Result;
use crate::llm::DEFAULT_FIELDS;
use crate::pipeline::RunArtifacts;
use crate::storage;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub url: String,
    pub fields: String,
    pub error: Option<String>,
    pub run: Option<RunView>,
}

/// What the page shows after a successful run.
pub struct RunView {
    pub timestamp: String,
    pub raw_file: String,
    pub json_file: String,
    pub spreadsheet_file: String,
    pub json_preview: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RunView {
    pub fn new(artifacts: &RunArtifacts) -> Result<Self> {
        let [raw_file, json_file, spreadsheet_file] = artifacts.file_names();
        let json_preview = String::from_utf8_lossy(&storage::to_indented_json(&artifacts.result)?)
            .into_owned();
        let table = artifacts.result.table();

        Ok(Self {
            timestamp: artifacts.timestamp.clone(),
            raw_file,
            json_file,
            spreadsheet_file,
            json_preview,
            columns: table.columns,
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        })
    }
}

pub fn default_fields_text() -> String {
    DEFAULT_FIELDS.join(", ")
}

impl IndexPage {
    pub fn blank() -> Self {
        Self {
            url: String::new(),
            fields: default_fields_text(),
            error: None,
            run: None,
        }
    }

    pub fn failed(url: String, fields: String, error: String) -> Self {
        Self {
            url,
            fields,
            error: Some(error),
            run: None,
        }
    }

    pub fn succeeded(url: String, fields: String, run: RunView) -> Self {
        Self {
            url,
            fields,
            error: None,
            run: Some(run),
        }
    }
}
