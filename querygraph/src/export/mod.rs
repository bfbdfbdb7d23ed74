// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result-set export to CSV and JSON
//!
//! The synchronous functions do the work; [`stringify`] runs them on the
//! blocking pool so large exports stay off the interaction path. Dropping the
//! returned future is the only way to abandon an export.

use csv::{Terminator, WriterBuilder};

use crate::error::SerializationError;
use crate::result::ResultSet;

/// Export formats offered for clipboard copy and file export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Render rows as CSV.
///
/// The header comes from the first row's columns. An empty result set gives
/// an empty string rather than a header-only table. NULL cells are empty.
pub fn to_csv(result: &ResultSet) -> Result<String, SerializationError> {
    let header = result.columns();
    if header.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&header)?;

    for row in &result.rows {
        let record: Vec<String> = header
            .iter()
            .map(|column| row.get(column).map(|v| v.to_cell_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SerializationError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializationError::Csv(e.to_string()))
}

/// Render rows as a JSON array with two-space indentation, columns in driver
/// order.
pub fn to_json(result: &ResultSet) -> Result<String, SerializationError> {
    Ok(serde_json::to_string_pretty(&result.rows)?)
}

pub fn to_format(result: &ResultSet, format: ExportFormat) -> Result<String, SerializationError> {
    match format {
        ExportFormat::Csv => to_csv(result),
        ExportFormat::Json => to_json(result),
    }
}

/// Serialize on the blocking pool. Takes an owned copy so the caller's result
/// can't be mutated while the export runs.
pub async fn stringify(result: ResultSet, format: ExportFormat) -> Result<String, SerializationError> {
    tokio::task::spawn_blocking(move || to_format(&result, format))
        .await
        .map_err(|e| SerializationError::Task(e.to_string()))?
}
