// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! QueryGraph - query lifecycle and relational-to-graph materialization
//!
//! The engine behind a SQL client that can draw result sets as graphs:
//!
//! ```text
//!  editor text ──> QueryCoordinator ──> Database (collaborator)
//!                        │                    │
//!                        │<──── rows ─────────┘
//!                        ▼
//!                   Query (Success) ──> GraphMaterializer ──> GraphPayload
//!                                                                 │
//!                                          decide_redraw ─────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`result`] - Scalar values, ordered rows, result sets
//! - [`graph`] - Row classification, materialization, redraw gating
//! - [`query`] - Query state machine, registry, coordinator
//! - [`export`] - CSV and JSON export
//! - [`collab`] - Database, file and clipboard collaborator traits
//! - [`config`] - Engine configuration
//! - [`error`] - Error types

pub mod collab;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod query;
pub mod result;

pub use collab::{Clipboard, Database, FileStore, FsFileStore, MemoryClipboard};
pub use config::EngineConfig;
pub use error::{
    ClipboardError, ConfigError, DatabaseError, Error, ExecutionError, PersistenceError,
    QueryError, Result, SerializationError,
};
pub use export::ExportFormat;
pub use graph::{
    decide_redraw, EdgeDescriptor, EndpointMarkers, GraphMaterializer, GraphPayload,
    NodeDescriptor, NodeMergePolicy, RedrawDecision, RenderProps, RowClassifier,
};
pub use query::{
    ExecutionOutcome, ExecutionReport, Query, QueryCoordinator, QueryId, QueryRegistry,
    QueryStatus,
};
pub use result::{Record, ResultSet, Row, Value};
