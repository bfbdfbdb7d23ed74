// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Terminal rendering of result sets and graph payloads

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use querygraph::result::Attributes;
use querygraph::{GraphPayload, ResultSet};

use super::commands::OutputFormat;

pub struct ResultFormatter;

impl ResultFormatter {
    /// Render rows as a table with one column per result column
    pub fn format_rows(result: &ResultSet) -> String {
        if result.is_empty() {
            return match result.affected_rows {
                Some(n) => format!("{} row(s) affected", n),
                None => "(no rows)".to_string(),
            };
        }

        let columns = result.columns();
        let mut table = new_table();
        table.set_header(columns.iter().map(|c| Cell::new(c)));
        for row in &result.rows {
            table.add_row(
                columns
                    .iter()
                    .map(|c| Cell::new(row.get(c).map(|v| v.to_string()).unwrap_or_default())),
            );
        }
        format!("{}\n{} row(s)", table, result.len())
    }

    pub fn format_graph(payload: &GraphPayload, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Json => payload.to_json_pretty(),
            OutputFormat::Table => Ok(Self::graph_tables(payload)),
        }
    }

    fn graph_tables(payload: &GraphPayload) -> String {
        let mut nodes = new_table();
        nodes.set_header(vec!["id", "attributes"]);
        for node in &payload.nodes {
            nodes.add_row(vec![Cell::new(&node.id), Cell::new(describe(&node.attributes))]);
        }

        let mut edges = new_table();
        edges.set_header(vec!["source", "target", "attributes"]);
        for edge in &payload.edges {
            edges.add_row(vec![
                Cell::new(&edge.source),
                Cell::new(&edge.target),
                Cell::new(describe(&edge.attributes)),
            ]);
        }

        format!(
            "Nodes ({}):\n{}\n\nEdges ({}):\n{}",
            payload.nodes.len(),
            nodes,
            payload.edges.len(),
            edges
        )
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn describe(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
