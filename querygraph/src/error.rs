// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for QueryGraph

use thiserror::Error;

use crate::query::QueryId;

/// Result type alias for QueryGraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a database connection
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DatabaseError {
    pub message: String,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Execution failure recorded on a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The database collaborator rejected or failed the query
    #[error("Database error: {0}")]
    Database(String),

    /// No connection is attached for the query's database
    #[error("No connection for database '{0}'")]
    ConnectionNotFound(String),

    /// The caller stopped awaiting the execution before it settled
    #[error("Execution abandoned before completion")]
    Abandoned,
}

impl From<DatabaseError> for ExecutionError {
    fn from(e: DatabaseError) -> Self {
        ExecutionError::Database(e.message)
    }
}

/// CSV/JSON conversion failure. Never mutates query state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// The background export task panicked or was cancelled
    #[error("Export task failed: {0}")]
    Task(String),
}

impl From<csv::Error> for SerializationError {
    fn from(e: csv::Error) -> Self {
        SerializationError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(e: serde_json::Error) -> Self {
        SerializationError::Json(e.to_string())
    }
}

/// Registry and lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query {0} not found")]
    NotFound(QueryId),

    #[error("No current query selected")]
    NoCurrentQuery,

    #[error("Query {0} is already executing")]
    AlreadyExecuting(QueryId),
}

/// Load/save failures
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither an explicit path nor a previously used filename is known
    #[error("No file path given and none remembered")]
    MissingPath,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Clipboard error: {0}")]
pub struct ClipboardError(pub String);

/// Invalid engine configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main error type for QueryGraph operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
