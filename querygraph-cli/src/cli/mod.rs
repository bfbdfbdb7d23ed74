// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for QueryGraph
//!
//! Materializes and exports JSON result sets, and replays queries against a
//! fixture database through the query coordinator.

pub mod commands;
pub mod fixtures;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_export, handle_graph, handle_run, handle_version, load_config};
