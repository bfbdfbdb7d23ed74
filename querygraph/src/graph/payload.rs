// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph payload handed to the rendering layer
//!
//! Serializes in the element shape graph-drawing libraries consume:
//!
//! ```json
//! {
//!   "nodes": [{ "data": { "id": "A", "type": "Person" } }],
//!   "edges": [{ "data": { "source": "A", "target": "B", "since": 2020 } }]
//! }
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

use crate::result::Attributes;

/// A graph node: identifier plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub id: String,
    pub attributes: Attributes,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    pub fn bare(id: impl Into<String>) -> Self {
        Self::new(id, Attributes::new())
    }
}

/// A directed relationship between two node identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDescriptor {
    pub source: String,
    pub target: String,
    pub attributes: Attributes,
}

impl EdgeDescriptor {
    pub fn new(source: impl Into<String>, target: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attributes,
        }
    }
}

/// Node set plus edge list.
///
/// Nodes are unique by id and kept in first-occurrence order; edges keep row
/// order. Every edge endpoint names a node of the same payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GraphPayload {
    pub nodes: Vec<NodeDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
}

impl GraphPayload {
    /// Two nodes joined by one edge, drawn before any query has produced a
    /// result so the surface is never blank.
    pub fn placeholder() -> Self {
        Self {
            nodes: vec![NodeDescriptor::bare("test1"), NodeDescriptor::bare("test2")],
            edges: vec![EdgeDescriptor::new("test1", "test2", Attributes::new())],
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Edges whose source or target is not in the node set.
    pub fn dangling_edges(&self) -> Vec<&EdgeDescriptor> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Serializes `{"data": {...}}` with the fixed keys first. Attributes that
/// would shadow a fixed key are skipped.
struct ElementData<'a> {
    fixed: &'a [(&'static str, &'a str)],
    attributes: &'a Attributes,
}

impl Serialize for ElementData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.fixed {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in self.attributes.iter() {
            if self.fixed.iter().any(|(fixed, _)| *fixed == key) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for NodeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "data",
            &ElementData {
                fixed: &[("id", self.id.as_str())],
                attributes: &self.attributes,
            },
        )?;
        map.end()
    }
}

impl Serialize for EdgeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            "data",
            &ElementData {
                fixed: &[("source", self.source.as_str()), ("target", self.target.as_str())],
                attributes: &self.attributes,
            },
        )?;
        map.end()
    }
}
