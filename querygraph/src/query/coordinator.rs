// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query coordinator
//!
//! Drives query lifecycles against the attached collaborators. The registry
//! lock is only held for synchronous state changes, never across an await,
//! so other queries keep executing while one waits on its database.

use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::decisions::{needs_new_query, should_execute_query, should_update_query};
use super::{ExecutionTicket, QueryId, QueryRegistry, Settlement};
use crate::collab::{
    display_stem, with_extension_enforced, Clipboard, Database, FileStore, FsFileStore,
    MemoryClipboard,
};
use crate::config::EngineConfig;
use crate::error::{ExecutionError, PersistenceError, QueryError, Result};
use crate::export::{self, ExportFormat};
use crate::graph::{GraphMaterializer, GraphPayload};
use crate::result::ResultSet;

/// How an execution request ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Rows stored on the query
    Succeeded { row_count: usize },
    /// Error stored on the query
    Failed(ExecutionError),
    /// The query was already executing; nothing happened
    Refused,
    /// A newer request superseded this one before it settled
    Stale,
    /// The query was removed while the request was in flight
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub query_id: QueryId,
    pub outcome: ExecutionOutcome,
}

/// Settles an in-flight execution as abandoned if the awaiting future is
/// dropped, so a query never stays `Executing` forever.
struct InFlight {
    registry: Arc<RwLock<QueryRegistry>>,
    query_id: QueryId,
    ticket: ExecutionTicket,
    armed: bool,
}

impl InFlight {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(query) = self.registry.write().get_mut(self.query_id) {
            if query.complete_failure(self.ticket, ExecutionError::Abandoned) == Settlement::Applied {
                warn!("Query {} abandoned while executing", self.query_id);
            }
        }
    }
}

pub struct QueryCoordinator {
    registry: Arc<RwLock<QueryRegistry>>,
    connections: RwLock<HashMap<String, Arc<dyn Database>>>,
    files: Arc<dyn FileStore>,
    clipboard: Arc<dyn Clipboard>,
    materializer: GraphMaterializer,
    config: EngineConfig,
}

impl Default for QueryCoordinator {
    fn default() -> Self {
        Self::with_validated(EngineConfig::default())
    }
}

impl QueryCoordinator {
    /// Coordinator with the local filesystem and an in-memory clipboard.
    /// Fails when `config` does not validate.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(QueryRegistry::new())),
            connections: RwLock::new(HashMap::new()),
            files: Arc::new(FsFileStore),
            clipboard: Arc::new(MemoryClipboard::new()),
            materializer: config.materializer(),
            config,
        }
    }

    pub fn with_file_store(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = files;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle on the registry, for readers that render query state
    pub fn registry(&self) -> &Arc<RwLock<QueryRegistry>> {
        &self.registry
    }

    pub fn attach_database(&self, name: impl Into<String>, database: Arc<dyn Database>) {
        let name = name.into();
        info!("Attached database '{}'", name);
        self.connections.write().insert(name, database);
    }

    pub fn detach_database(&self, name: &str) -> bool {
        self.connections.write().remove(name).is_some()
    }

    fn connection(&self, database: &str) -> Option<Arc<dyn Database>> {
        self.connections.read().get(database).cloned()
    }

    pub fn new_query(&self, database: impl Into<String>) -> QueryId {
        self.registry.write().create(database)
    }

    pub fn select_query(&self, id: QueryId) -> Result<()> {
        Ok(self.registry.write().select(id)?)
    }

    /// Remove a query. If it was current the caller must select another.
    pub fn remove_query(&self, id: QueryId) -> Result<()> {
        self.registry.write().remove(id)?;
        Ok(())
    }

    pub fn current_query_id(&self) -> Option<QueryId> {
        self.registry.read().current_id()
    }

    fn require_current(&self) -> Result<QueryId> {
        Ok(self.current_query_id().ok_or(QueryError::NoCurrentQuery)?)
    }

    /// Execute `text` on query `id` unless it is already executing.
    pub async fn execute_if_needed(&self, id: QueryId, text: &str) -> Result<ExecutionReport> {
        let (ticket, database) = {
            let mut registry = self.registry.write();
            let query = registry.require_mut(id)?;
            if !should_execute_query(Some(&*query)) {
                debug!("Query {} is busy, execution refused", id);
                return Ok(ExecutionReport {
                    query_id: id,
                    outcome: ExecutionOutcome::Refused,
                });
            }
            let ticket = query.start_execution(text, false, self.config.history_limit)?;
            (ticket, query.database.clone())
        };

        let connection = self.connection(&database);
        Ok(self.run(id, ticket, text, &database, connection).await)
    }

    pub async fn execute_current_if_needed(&self, text: &str) -> Result<ExecutionReport> {
        let id = self.require_current()?;
        self.execute_if_needed(id, text).await
    }

    /// Preview the top rows of `table`.
    ///
    /// Reuses the current query unless it holds user text for another
    /// database, in which case a new query is opened first.
    pub async fn execute_default_select_if_needed(
        &self,
        database: &str,
        table: &str,
    ) -> Result<ExecutionReport> {
        let connection = self
            .connection(database)
            .ok_or_else(|| ExecutionError::ConnectionNotFound(database.to_string()))?;
        let select = connection.default_select_query(table).await?;

        let (id, ticket) = {
            let mut registry = self.registry.write();
            if !should_execute_query(registry.current()) {
                let current = registry.current_id().ok_or(QueryError::NoCurrentQuery)?;
                debug!("Query {} is busy, default select refused", current);
                return Ok(ExecutionReport {
                    query_id: current,
                    outcome: ExecutionOutcome::Refused,
                });
            }

            let id = match registry.current_id() {
                Some(id) if !needs_new_query(registry.current(), database, &select) => id,
                _ => registry.create(database),
            };
            let query = registry.require_mut(id)?;
            query.database = database.to_string();
            query.replace_text(&select, None);
            let ticket = query.start_execution(&select, true, self.config.history_limit)?;
            (id, ticket)
        };

        Ok(self.run(id, ticket, &select, database, Some(connection)).await)
    }

    async fn run(
        &self,
        id: QueryId,
        ticket: ExecutionTicket,
        text: &str,
        database: &str,
        connection: Option<Arc<dyn Database>>,
    ) -> ExecutionReport {
        info!("Executing query {} on '{}'", id, database);
        let guard = InFlight {
            registry: Arc::clone(&self.registry),
            query_id: id,
            ticket,
            armed: true,
        };

        let response = match connection {
            Some(connection) => connection.execute_query(text).await.map_err(ExecutionError::from),
            None => Err(ExecutionError::ConnectionNotFound(database.to_string())),
        };
        guard.disarm();

        let mut registry = self.registry.write();
        let Some(query) = registry.get_mut(id) else {
            debug!("Query {} removed before its result arrived", id);
            return ExecutionReport {
                query_id: id,
                outcome: ExecutionOutcome::Discarded,
            };
        };

        let (settlement, outcome) = match response {
            Ok(remote) => {
                let row_count = remote.len();
                let settlement = query.complete_success(ticket, &remote);
                (settlement, ExecutionOutcome::Succeeded { row_count })
            }
            Err(error) => {
                warn!("Query {} failed: {}", id, error);
                let settlement = query.complete_failure(ticket, error.clone());
                (settlement, ExecutionOutcome::Failed(error))
            }
        };

        let outcome = match settlement {
            Settlement::Applied => {
                info!("Query {} settled as {}", id, query.status());
                outcome
            }
            Settlement::Stale => ExecutionOutcome::Stale,
        };
        ExecutionReport { query_id: id, outcome }
    }

    /// Apply an editor change unless it is redundant or the query is busy.
    pub fn update_if_needed(&self, id: QueryId, text: &str, selected_text: Option<&str>) -> Result<bool> {
        let mut registry = self.registry.write();
        let query = registry.require_mut(id)?;
        if !should_update_query(Some(&*query), text, selected_text) {
            return Ok(false);
        }
        query.replace_text(text, selected_text);
        Ok(true)
    }

    /// Append a line to the current query
    pub fn append_to_current(&self, text: &str) -> Result<bool> {
        let mut registry = self.registry.write();
        let query = registry.current_mut().ok_or(QueryError::NoCurrentQuery)?;
        Ok(query.append_text(text))
    }

    pub fn update_graph_style(&self, id: QueryId, style: &str) -> Result<()> {
        let mut registry = self.registry.write();
        registry.require_mut(id)?.graph_style = Some(style.to_string());
        Ok(())
    }

    /// Graph of the query's latest result, or the placeholder graph
    pub fn graph_for(&self, id: QueryId) -> Result<GraphPayload> {
        let registry = self.registry.read();
        let query = registry.require(id)?;
        Ok(self.materializer.materialize_or_placeholder(query.result()))
    }

    /// The query's own stylesheet, falling back to the configured default
    pub fn graph_style_for(&self, id: QueryId) -> Result<String> {
        let registry = self.registry.read();
        let query = registry.require(id)?;
        Ok(query
            .graph_style
            .clone()
            .unwrap_or_else(|| self.config.default_graph_style.clone()))
    }

    /// Serialize the latest result and place it on the clipboard.
    ///
    /// A query without a result copies an empty export. Failures leave the
    /// query untouched.
    pub async fn copy_to_clipboard(&self, id: QueryId, format: ExportFormat) -> Result<String> {
        let snapshot = {
            let registry = self.registry.read();
            registry.require(id)?.result().cloned().unwrap_or_default()
        };

        let text = export::stringify(snapshot, format).await?;
        self.clipboard.write_text(&text)?;

        let marked = self
            .registry
            .write()
            .get_mut(id)
            .map_or(false, |query| query.mark_copied());
        if !marked {
            debug!("Query {} is executing, copied flag left unset", id);
        }
        debug!("Copied query {} result as {}", id, format);
        Ok(text)
    }

    /// Save the query text as `.sql`, to `path` or the remembered filename.
    pub async fn save_query(&self, id: QueryId, path: Option<PathBuf>) -> Result<PathBuf> {
        let (target, text) = {
            let registry = self.registry.read();
            let query = registry.require(id)?;
            let target = path
                .or_else(|| query.filename.clone())
                .ok_or(PersistenceError::MissingPath)?;
            (with_extension_enforced(target, "sql"), query.text().to_string())
        };

        self.files.write_text(&target, &text).await?;

        let mut registry = self.registry.write();
        if let Some(query) = registry.get_mut(id) {
            if let Some(stem) = display_stem(&target) {
                query.name = stem;
            }
            query.filename = Some(target.clone());
        }
        Ok(target)
    }

    /// Save the graph style as `.css`, to `path` or the remembered filename.
    pub async fn save_graph_style(&self, id: QueryId, path: Option<PathBuf>) -> Result<PathBuf> {
        let (target, style) = {
            let registry = self.registry.read();
            let query = registry.require(id)?;
            let target = path
                .or_else(|| query.graph_style_filename.clone())
                .ok_or(PersistenceError::MissingPath)?;
            let style = query
                .graph_style
                .clone()
                .unwrap_or_else(|| self.config.default_graph_style.clone());
            (with_extension_enforced(target, "css"), style)
        };

        self.files.write_text(&target, &style).await?;

        if let Some(query) = self.registry.write().get_mut(id) {
            query.graph_style_filename = Some(target.clone());
        }
        Ok(target)
    }

    /// Load query text from `path` into query `id`.
    pub async fn import_query(&self, id: QueryId, path: &Path) -> Result<()> {
        self.registry.read().require(id)?;
        let text = self.files.read_text(path).await?;

        let mut registry = self.registry.write();
        let query = registry.require_mut(id)?;
        if query.is_executing() {
            return Err(QueryError::AlreadyExecuting(id).into());
        }
        query.replace_text(&text, None);
        if let Some(stem) = display_stem(path) {
            query.name = stem;
        }
        query.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Load a graph stylesheet from `path` into query `id`.
    pub async fn import_graph_style(&self, id: QueryId, path: &Path) -> Result<()> {
        self.registry.read().require(id)?;
        let style = self.files.read_text(path).await?;

        let mut registry = self.registry.write();
        let query = registry.require_mut(id)?;
        if query.is_executing() {
            return Err(QueryError::AlreadyExecuting(id).into());
        }
        query.graph_style = Some(style);
        query.graph_style_filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Clone of the latest result, if any
    pub fn result_of(&self, id: QueryId) -> Result<Option<ResultSet>> {
        Ok(self.registry.read().require(id)?.result().cloned())
    }
}
