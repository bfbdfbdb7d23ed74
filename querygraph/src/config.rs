// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine configuration
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "merge_policy": "merge-missing", "history_limit": 50 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::graph::{EndpointMarkers, GraphMaterializer, NodeMergePolicy};

/// Stylesheet used for queries that have no graph style of their own
pub const DEFAULT_GRAPH_STYLE: &str = r#"
node {
  height: 80;
  width: 80;
  background-fit: cover;
  border-color: #000;
  border-width: 3;
  border-opacity: 0.5;
  content: data(name);
  text-valign: center;
}
edge {
  width: 6;
  target-arrow-shape: triangle;
  line-color: #ffaaaa;
  target-arrow-color: #ffaaaa;
  curve-style: bezier;
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Column naming convention for graph endpoints
    pub markers: EndpointMarkers,
    /// Attribute handling for node ids repeated across rows
    pub merge_policy: NodeMergePolicy,
    /// Maximum history entries kept per query (unbounded when absent)
    pub history_limit: Option<usize>,
    pub default_graph_style: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            markers: EndpointMarkers::default(),
            merge_policy: NodeMergePolicy::default(),
            history_limit: None,
            default_graph_style: DEFAULT_GRAPH_STYLE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.markers.validate().map_err(ConfigError::Invalid)?;
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn materializer(&self) -> GraphMaterializer {
        GraphMaterializer::new(self.markers.clone(), self.merge_policy)
    }
}
