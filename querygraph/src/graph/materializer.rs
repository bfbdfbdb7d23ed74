// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relational-to-graph materialization

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::classifier::{EndpointMarkers, RowClassifier};
use super::{GraphPayload, NodeDescriptor};
use crate::result::{ResultSet, Row};

/// How attributes of a node id seen in several rows are combined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NodeMergePolicy {
    /// Keep the attributes of the first occurrence, ignore later ones
    #[default]
    FirstSeen,
    /// Keep first-seen values, add columns only later rows carry
    MergeMissing,
    /// Later values replace earlier ones
    LastWins,
}

impl std::str::FromStr for NodeMergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-seen" => Ok(NodeMergePolicy::FirstSeen),
            "merge-missing" => Ok(NodeMergePolicy::MergeMissing),
            "last-wins" => Ok(NodeMergePolicy::LastWins),
            _ => Err(format!(
                "Unknown merge policy: {}. Valid options: first-seen, merge-missing, last-wins",
                s
            )),
        }
    }
}

impl std::fmt::Display for NodeMergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeMergePolicy::FirstSeen => "first-seen",
            NodeMergePolicy::MergeMissing => "merge-missing",
            NodeMergePolicy::LastWins => "last-wins",
        };
        write!(f, "{}", name)
    }
}

/// Builds a [`GraphPayload`] from a full result set.
#[derive(Debug, Clone, Default)]
pub struct GraphMaterializer {
    classifier: RowClassifier,
    merge_policy: NodeMergePolicy,
}

/// Incremental node set: unique ids, first-occurrence order.
struct NodeSet {
    nodes: Vec<NodeDescriptor>,
    index: HashMap<String, usize>,
    policy: NodeMergePolicy,
}

impl NodeSet {
    fn new(policy: NodeMergePolicy) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    fn add(&mut self, node: NodeDescriptor) {
        match self.index.get(&node.id) {
            Some(&position) => {
                let existing = &mut self.nodes[position].attributes;
                match self.policy {
                    NodeMergePolicy::FirstSeen => {}
                    NodeMergePolicy::MergeMissing => existing.merge_missing(&node.attributes),
                    NodeMergePolicy::LastWins => existing.merge_overwrite(&node.attributes),
                }
            }
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }
}

impl GraphMaterializer {
    pub fn new(markers: EndpointMarkers, merge_policy: NodeMergePolicy) -> Self {
        Self {
            classifier: RowClassifier::new(markers),
            merge_policy,
        }
    }

    pub fn classifier(&self) -> &RowClassifier {
        &self.classifier
    }

    pub fn merge_policy(&self) -> NodeMergePolicy {
        self.merge_policy
    }

    /// Materialize `rows`. Rows without both endpoint ids contribute nothing.
    pub fn materialize(&self, rows: &[Row]) -> GraphPayload {
        let mut nodes = NodeSet::new(self.merge_policy);
        let mut edges = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;

        for row in rows {
            match self.classifier.classify(row) {
                Some(classified) => {
                    nodes.add(classified.first);
                    nodes.add(classified.second);
                    edges.push(classified.edge);
                }
                None => skipped += 1,
            }
        }

        debug!(
            "Materialized {} nodes and {} edges from {} rows ({} without endpoints)",
            nodes.nodes.len(),
            edges.len(),
            rows.len(),
            skipped
        );

        GraphPayload {
            nodes: nodes.nodes,
            edges,
        }
    }

    /// Materialize the latest result, or the placeholder graph when no query
    /// has produced one yet.
    pub fn materialize_or_placeholder(&self, result: Option<&ResultSet>) -> GraphPayload {
        match result {
            Some(result) => self.materialize(&result.rows),
            None => GraphPayload::placeholder(),
        }
    }
}
