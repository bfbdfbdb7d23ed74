// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query lifecycle management
//!
//! This module provides:
//! - The per-query state machine (Idle, Executing, Success, Failed)
//! - The registry of open queries and the current-query pointer
//! - Guards deciding whether to execute, update, or open a new query
//! - The coordinator running executions against database collaborators

pub mod coordinator;
pub mod decisions;
pub mod registry;
pub mod state;

pub use coordinator::{ExecutionOutcome, ExecutionReport, QueryCoordinator};
pub use decisions::{needs_new_query, should_execute_query, should_update_query};
pub use registry::QueryRegistry;
pub use state::{ExecutionTicket, HistoryEntry, Query, QueryId, QueryStatus, Settlement};
