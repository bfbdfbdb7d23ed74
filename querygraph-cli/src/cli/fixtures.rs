// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fixture database backed by a JSON file
//!
//! ```json
//! {
//!   "default_select": "SELECT * FROM {table} LIMIT 1000",
//!   "queries": { "SELECT * FROM people LIMIT 1000": [{ "id": 1, "name": "Ada" }] },
//!   "errors": { "SELEC 1": "syntax error at or near \"SELEC\"" }
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use querygraph::{Database, DatabaseError, ResultSet, Row};

fn default_select_template() -> String {
    "SELECT * FROM {table} LIMIT 1000".to_string()
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixtures {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct FixtureDatabase {
    #[serde(default = "default_select_template")]
    default_select: String,
    #[serde(default)]
    queries: HashMap<String, Vec<Row>>,
    #[serde(default)]
    errors: HashMap<String, String>,
}

impl FixtureDatabase {
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn lookup(&self, text: &str) -> Result<Vec<Row>, DatabaseError> {
        let key = text.trim().trim_end_matches(';').trim();
        if let Some(message) = self.errors.get(key) {
            return Err(DatabaseError::new(message.clone()));
        }
        self.queries
            .get(key)
            .cloned()
            .ok_or_else(|| DatabaseError::new(format!("No fixture rows for query: {}", key)))
    }
}

#[async_trait]
impl Database for FixtureDatabase {
    async fn execute_query(&self, text: &str) -> Result<Arc<ResultSet>, DatabaseError> {
        Ok(Arc::new(ResultSet::new(self.lookup(text)?)))
    }

    async fn default_select_query(&self, table: &str) -> Result<String, DatabaseError> {
        Ok(self.default_select.replace("{table}", table))
    }
}
