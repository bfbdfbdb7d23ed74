// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Tabular result sets

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::Row;

/// An ordered sequence of uniform-shape rows returned by one query execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    /// Rows touched by a non-select statement, when the driver reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<u64>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            affected_rows: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names taken from the first row, in driver order.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().collect())
            .unwrap_or_default()
    }

    /// Produce an independently owned copy of a result handed out by a
    /// connection.
    ///
    /// The connection may keep its own handle on `remote` (cursor buffers,
    /// pooled results). The copy is rebuilt row by row and shares no
    /// allocation with it, so a query can keep its result after the
    /// connection is closed or reused.
    pub fn detached_copy(remote: &Arc<ResultSet>) -> ResultSet {
        let rows = remote
            .rows
            .iter()
            .map(|row| row.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
            .collect();
        ResultSet {
            rows,
            affected_rows: remote.affected_rows,
        }
    }
}

impl From<Vec<Row>> for ResultSet {
    fn from(rows: Vec<Row>) -> Self {
        ResultSet::new(rows)
    }
}
