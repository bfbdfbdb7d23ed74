// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result-set data model
//!
//! Rows are insertion-ordered column maps of scalar values. The same map type
//! doubles as the attribute map of graph nodes and edges.

pub mod record;
pub mod result_set;
pub mod value;

pub use record::{Attributes, Record, Row};
pub use result_set::ResultSet;
pub use value::Value;
