use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

use crate::pipeline::RunArtifacts;

/// Body of the HTML form on the index page.
#[derive(Deserialize)]
pub struct RunForm {
    pub url: String,
    #[serde(default)]
    pub fields: String,
}

#[derive(Deserialize)]
pub struct RunRequest {
    pub url: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Serialize)]
pub struct RunResponse {
    pub url: String,
    pub timestamp: String,
    pub raw_file: String,
    pub json_file: String,
    pub spreadsheet_file: String,
    pub result_kind: String,
    pub data: Value,
    pub completed_at: DateTime<Utc>,
}

impl RunResponse {
    pub fn new(url: &str, artifacts: &RunArtifacts) -> Self {
        let [raw_file, json_file, spreadsheet_file] = artifacts.file_names();
        Self {
            url: url.to_string(),
            timestamp: artifacts.timestamp.clone(),
            raw_file,
            json_file,
            spreadsheet_file,
            result_kind: artifacts.result.kind().to_string(),
            data: artifacts.result.to_value(),
            completed_at: Utc::now(),
        }
    }
}
