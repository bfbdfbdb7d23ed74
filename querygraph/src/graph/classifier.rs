// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row classification by endpoint markers
//!
//! A row describes one relationship when its columns follow the pairing
//! convention:
//!
//! ```text
//!   node1 | type1  | node2 | type2  | since
//!   ------+--------+-------+--------+------
//!   A     | Person | B     | Person | 2020
//! ```
//!
//! - `node1` / `node2` (identity prefix + marker) carry the endpoint ids
//! - a column containing the first marker is an attribute of the first node,
//!   stored under its name with the marker removed (`type1` -> `type`)
//! - a column containing the second marker belongs to the second node
//! - every other column is an attribute of the relationship
//!
//! Markers are tested in that order, so a column containing both markers is
//! assigned to the first node.

use serde::{Deserialize, Serialize};

use super::{EdgeDescriptor, NodeDescriptor};
use crate::result::{Attributes, Row};

/// Column naming convention used to pair rows into graph endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointMarkers {
    /// Prefix of the identity columns (`node` -> `node1`, `node2`)
    pub identity_prefix: String,
    /// Marker of the first endpoint
    pub first: String,
    /// Marker of the second endpoint
    pub second: String,
}

impl Default for EndpointMarkers {
    fn default() -> Self {
        Self {
            identity_prefix: "node".to_string(),
            first: "1".to_string(),
            second: "2".to_string(),
        }
    }
}

impl EndpointMarkers {
    pub fn first_identity_column(&self) -> String {
        format!("{}{}", self.identity_prefix, self.first)
    }

    pub fn second_identity_column(&self) -> String {
        format!("{}{}", self.identity_prefix, self.second)
    }

    /// Markers must be non-empty and distinct, otherwise every column would
    /// match the first one.
    pub fn validate(&self) -> Result<(), String> {
        if self.first.is_empty() || self.second.is_empty() {
            return Err("endpoint markers must not be empty".to_string());
        }
        if self.first == self.second {
            return Err(format!(
                "endpoint markers must differ (both are '{}')",
                self.first
            ));
        }
        Ok(())
    }
}

/// Which part of the relationship a column describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    FirstIdentity,
    SecondIdentity,
    FirstNode,
    SecondNode,
    Relationship,
}

/// Output of classifying one row: two endpoints and the edge joining them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub first: NodeDescriptor,
    pub second: NodeDescriptor,
    pub edge: EdgeDescriptor,
}

/// Splits rows into node and relationship descriptors.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    markers: EndpointMarkers,
    first_identity: String,
    second_identity: String,
}

impl Default for RowClassifier {
    fn default() -> Self {
        Self::new(EndpointMarkers::default())
    }
}

impl RowClassifier {
    pub fn new(markers: EndpointMarkers) -> Self {
        Self {
            first_identity: markers.first_identity_column(),
            second_identity: markers.second_identity_column(),
            markers,
        }
    }

    pub fn markers(&self) -> &EndpointMarkers {
        &self.markers
    }

    /// Decide which side of the relationship a column belongs to.
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if column == self.first_identity {
            ColumnRole::FirstIdentity
        } else if column == self.second_identity {
            ColumnRole::SecondIdentity
        } else if column.contains(self.markers.first.as_str()) {
            ColumnRole::FirstNode
        } else if column.contains(self.markers.second.as_str()) {
            ColumnRole::SecondNode
        } else {
            ColumnRole::Relationship
        }
    }

    /// Classify one row.
    ///
    /// Returns `None` when either identity column is missing, NULL or empty:
    /// partial joins are dropped, never defaulted.
    pub fn classify(&self, row: &Row) -> Option<ClassifiedRow> {
        let first_id = row.get(&self.first_identity).filter(|v| !v.is_blank())?;
        let second_id = row.get(&self.second_identity).filter(|v| !v.is_blank())?;

        let mut first_attrs = Attributes::new();
        let mut second_attrs = Attributes::new();
        let mut edge_attrs = Attributes::new();

        for (column, value) in row.iter() {
            match self.role_of(column) {
                ColumnRole::FirstIdentity | ColumnRole::SecondIdentity => {}
                ColumnRole::FirstNode => {
                    first_attrs.insert(strip_marker(column, &self.markers.first), value.clone());
                }
                ColumnRole::SecondNode => {
                    second_attrs.insert(strip_marker(column, &self.markers.second), value.clone());
                }
                ColumnRole::Relationship => {
                    edge_attrs.insert(column, value.clone());
                }
            }
        }

        let first = NodeDescriptor::new(first_id.to_string(), first_attrs);
        let second = NodeDescriptor::new(second_id.to_string(), second_attrs);
        let edge = EdgeDescriptor::new(first.id.clone(), second.id.clone(), edge_attrs);

        Some(ClassifiedRow { first, second, edge })
    }
}

/// Remove the first occurrence of `marker` from `column`.
fn strip_marker(column: &str, marker: &str) -> String {
    column.replacen(marker, "", 1)
}
