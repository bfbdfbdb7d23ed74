// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for QueryGraph

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use querygraph::query::ExecutionOutcome;
use querygraph::{export, EngineConfig, ExportFormat, QueryCoordinator, QueryStatus, ResultSet, Row};

use super::commands::OutputFormat;
use super::fixtures::FixtureDatabase;
use super::output::ResultFormatter;

/// Load the engine config, or defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(EngineConfig::from_json_file(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Read a JSON array of row objects
fn read_result_set(path: &Path) -> Result<ResultSet, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    let rows: Vec<Row> = serde_json::from_str(&text)?;
    Ok(ResultSet::new(rows))
}

/// Handle the version command
pub fn handle_version() {
    println!("{}", format!("querygraph {}", env!("CARGO_PKG_VERSION")).bold().green());
    println!("Query lifecycle and relational-to-graph materialization");
}

/// Handle the graph command
pub fn handle_graph(
    config: &EngineConfig,
    input: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = input.as_deref().map(read_result_set).transpose()?;
    let payload = config.materializer().materialize_or_placeholder(result.as_ref());

    if let Some(result) = &result {
        log::info!(
            "{} rows produced {} nodes and {} edges",
            result.len(),
            payload.nodes.len(),
            payload.edges.len()
        );
    }

    println!("{}", ResultFormatter::format_graph(&payload, format)?);
    Ok(())
}

/// Handle the export command
pub async fn handle_export(
    input: PathBuf,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = read_result_set(&input)?;
    let text = export::stringify(result, format).await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &text).await?;
            println!("{}", format!("Exported {} to {:?}", format, path).green());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Handle the run command: execute one query or table preview through the
/// coordinator and print the result and its graph
pub async fn handle_run(
    config: EngineConfig,
    fixtures: PathBuf,
    database: String,
    table: Option<String>,
    query: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let fixture = FixtureDatabase::from_file(&fixtures)?;
    let coordinator = QueryCoordinator::new(config)?;
    coordinator.attach_database(database.as_str(), Arc::new(fixture));

    let report = match (table, query) {
        (Some(table), _) => {
            coordinator
                .execute_default_select_if_needed(&database, &table)
                .await?
        }
        (None, Some(text)) => {
            let id = coordinator.new_query(database.as_str());
            coordinator.update_if_needed(id, &text, None)?;
            coordinator.execute_if_needed(id, &text).await?
        }
        (None, None) => return Err("Either a query or --table is required".into()),
    };

    let (status, text) = {
        let registry = coordinator.registry().read();
        let query = registry.require(report.query_id)?;
        (query.status(), query.text().to_string())
    };
    println!("{}", format!("{} [{}]", text, status).cyan());

    match report.outcome {
        ExecutionOutcome::Failed(error) => return Err(error.into()),
        ExecutionOutcome::Succeeded { .. } if status == QueryStatus::Success => {}
        other => return Err(format!("Query did not complete: {:?}", other).into()),
    }

    if let Some(result) = coordinator.result_of(report.query_id)? {
        println!("{}", ResultFormatter::format_rows(&result));
    }

    let payload = coordinator.graph_for(report.query_id)?;
    println!();
    println!("{}", ResultFormatter::format_graph(&payload, format)?);
    Ok(())
}
