//! One run: fetch, persist raw, extract, persist structured.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extraction::ExtractionResult;
use crate::llm::Extractor;
use crate::scraper::ContentFetcher;
use crate::storage;

/// Splits comma-separated user input into trimmed, non-empty field names.
pub fn parse_fields(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub timestamp: String,
    pub raw_path: PathBuf,
    pub json_path: PathBuf,
    pub spreadsheet_path: PathBuf,
    pub result: ExtractionResult,
}

impl RunArtifacts {
    pub fn file_names(&self) -> [String; 3] {
        [
            storage::raw_file_name(&self.timestamp),
            storage::json_file_name(&self.timestamp),
            storage::spreadsheet_file_name(&self.timestamp),
        ]
    }
}

#[derive(Clone)]
pub struct Pipeline {
    fetcher: ContentFetcher,
    extractor: Extractor,
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(fetcher: ContentFetcher, extractor: Extractor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            extractor,
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ContentFetcher::firecrawl(config),
            Extractor::openai(config),
            config.output_dir.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn run(&self, url: &str, fields: &[String]) -> Result<RunArtifacts> {
        let timestamp = storage::run_timestamp();
        let start = Instant::now();
        info!(url, %timestamp, "Starting run");

        let outcome = self.run_with_timestamp(url, fields, &timestamp).await;
        match &outcome {
            Ok(artifacts) => info!(
                %timestamp,
                kind = artifacts.result.kind(),
                elapsed = ?start.elapsed(),
                "Run completed"
            ),
            Err(e) => error!(%timestamp, elapsed = ?start.elapsed(), "Run failed: {}", e),
        }
        outcome
    }

    pub async fn run_with_timestamp(
        &self,
        url: &str,
        fields: &[String],
        timestamp: &str,
    ) -> Result<RunArtifacts> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::FetchError("A URL is required".to_string()));
        }

        let raw = self.fetcher.fetch(url).await?;
        let raw_path = storage::save_raw(&raw, timestamp, &self.output_dir).await?;

        let result = self.extractor.extract(&raw, fields).await?;
        let (json_path, spreadsheet_path) =
            storage::save_structured(&result, timestamp, &self.output_dir).await?;

        Ok(RunArtifacts {
            timestamp: timestamp.to_string(),
            raw_path,
            json_path,
            spreadsheet_path,
            result,
        })
    }
}
