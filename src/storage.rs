use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::error::{AppError, Result};
use crate::extraction::{Cell, ExtractionResult, Table};

pub const RAW_PREFIX: &str = "rawData_";
pub const STRUCTURED_PREFIX: &str = "sorted_data_";

/// Longest text Excel keeps in one cell, counted in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Second-granularity run tag, e.g. `20240131_235959`.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn raw_file_name(timestamp: &str) -> String {
    format!("{}{}.md", RAW_PREFIX, timestamp)
}

pub fn json_file_name(timestamp: &str) -> String {
    format!("{}{}.json", STRUCTURED_PREFIX, timestamp)
}

pub fn spreadsheet_file_name(timestamp: &str) -> String {
    format!("{}{}.xlsx", STRUCTURED_PREFIX, timestamp)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Raw,
    Json,
    Spreadsheet,
}

impl ArtifactKind {
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Raw => "text/markdown; charset=utf-8",
            ArtifactKind::Json => "application/json",
            ArtifactKind::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// Recognises the names this module writes and nothing else.
pub fn artifact_kind(file_name: &str) -> Option<ArtifactKind> {
    let (kind, stamp) = if let Some(rest) = file_name.strip_prefix(RAW_PREFIX) {
        (ArtifactKind::Raw, rest.strip_suffix(".md")?)
    } else if let Some(rest) = file_name.strip_prefix(STRUCTURED_PREFIX) {
        if let Some(stamp) = rest.strip_suffix(".json") {
            (ArtifactKind::Json, stamp)
        } else {
            (ArtifactKind::Spreadsheet, rest.strip_suffix(".xlsx")?)
        }
    } else {
        return None;
    };

    NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S")
        .is_ok()
        .then_some(kind)
}

/// Cuts text to [`MAX_CELL_CHARS`] on a char boundary.
pub fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub async fn save_raw(content: &str, timestamp: &str, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;

    let path = dir.join(raw_file_name(timestamp));
    fs::write(&path, content).await?;

    info!(path = %path.display(), bytes = content.len(), "Saved raw content");
    Ok(path)
}

pub async fn save_structured(
    result: &ExtractionResult,
    timestamp: &str,
    dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).await?;

    let json_path = dir.join(json_file_name(timestamp));
    fs::write(&json_path, to_indented_json(result)?).await?;

    let table = result.table();
    let spreadsheet_path = dir.join(spreadsheet_file_name(timestamp));
    fs::write(&spreadsheet_path, spreadsheet_bytes(&table)?).await?;

    info!(
        json = %json_path.display(),
        spreadsheet = %spreadsheet_path.display(),
        rows = table.rows.len(),
        columns = table.columns.len(),
        "Saved structured data"
    );
    Ok((json_path, spreadsheet_path))
}

pub fn to_indented_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| AppError::Io(e.into()))?;
    Ok(buf)
}

pub fn spreadsheet_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, cell_text(name), &header)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    sheet.write_string(r, c, cell_text(text))?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
