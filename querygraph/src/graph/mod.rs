// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph view of tabular results
//!
//! This module provides:
//! - Row classification by endpoint markers (`node1`, `type2`, ...)
//! - Materialization of a result set into a deduplicated node/edge payload
//! - Redraw gating so the graph is only rebuilt when new data arrives

pub mod classifier;
pub mod materializer;
pub mod payload;
pub mod redraw;

pub use classifier::{ClassifiedRow, ColumnRole, EndpointMarkers, RowClassifier};
pub use materializer::{GraphMaterializer, NodeMergePolicy};
pub use payload::{EdgeDescriptor, GraphPayload, NodeDescriptor};
pub use redraw::{decide_redraw, RedrawDecision, RenderProps};
