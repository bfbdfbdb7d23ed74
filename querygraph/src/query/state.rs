// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query state and lifecycle transitions
//!
//! ```text
//!   Idle ─┐
//! Success ├─ start_execution ─> Executing ─┬─ complete_success ─> Success
//!  Failed ┘                                └─ complete_failure ─> Failed
//! ```
//!
//! Each execution gets an [`ExecutionTicket`]. A completion carrying any
//! ticket other than the one in flight is stale and leaves the query
//! untouched, so a late response can never overwrite a newer request.
//! While executing, the previous result and error stay visible.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ExecutionError, QueryError};
use crate::graph::RenderProps;
use crate::result::ResultSet;

/// Stable query identifier, unique within a registry and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryId(pub u64);

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryStatus {
    #[default]
    Idle,
    Executing,
    Success,
    Failed,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStatus::Idle => "idle",
            QueryStatus::Executing => "executing",
            QueryStatus::Success => "success",
            QueryStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Tag identifying one execution request of one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionTicket(u64);

/// Whether a completion was applied or ignored as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Stale,
}

/// One executed query text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub text: String,
    pub default_select: bool,
    pub requested_at: DateTime<Utc>,
}

/// One query tab: text, execution state and latest result.
#[derive(Debug, Clone)]
pub struct Query {
    id: QueryId,
    /// Database the query runs against
    pub database: String,
    /// Display name ("Query #3", or the file stem once saved)
    pub name: String,
    /// File the query text was saved to or imported from
    pub filename: Option<PathBuf>,
    pub graph_style: Option<String>,
    pub graph_style_filename: Option<PathBuf>,

    text: String,
    selected_text: Option<String>,
    status: QueryStatus,
    result: Option<ResultSet>,
    error: Option<ExecutionError>,
    history: Vec<HistoryEntry>,
    is_default_select: bool,
    copied: bool,
    in_flight: Option<ExecutionTicket>,
    next_ticket: u64,
}

impl Query {
    pub fn new(id: QueryId, database: impl Into<String>) -> Self {
        Self {
            id,
            database: database.into(),
            name: format!("Query {}", id),
            filename: None,
            graph_style: None,
            graph_style_filename: None,
            text: String::new(),
            selected_text: None,
            status: QueryStatus::Idle,
            result: None,
            error: None,
            history: Vec::new(),
            is_default_select: false,
            copied: false,
            in_flight: None,
            next_ticket: 1,
        }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_executing(&self) -> bool {
        self.status == QueryStatus::Executing
    }

    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        self.error.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_default_select(&self) -> bool {
        self.is_default_select
    }

    pub fn copied(&self) -> bool {
        self.copied
    }

    pub fn in_flight(&self) -> Option<ExecutionTicket> {
        self.in_flight
    }

    /// Whether an edit would change anything. Refused while executing.
    pub fn should_update(&self, text: &str, selected_text: Option<&str>) -> bool {
        if self.is_executing() {
            return false;
        }
        !(self.text == text && self.selected_text.as_deref() == selected_text)
    }

    /// Apply an editor change if [`Query::should_update`] allows it.
    pub fn update_text(&mut self, text: &str, selected_text: Option<&str>) -> bool {
        if !self.should_update(text, selected_text) {
            debug!("Query {} ignored redundant or blocked edit", self.id);
            return false;
        }
        self.replace_text(text, selected_text);
        true
    }

    /// Unconditional text replacement, used once a caller has already
    /// decided the edit must happen.
    pub(crate) fn replace_text(&mut self, text: &str, selected_text: Option<&str>) {
        self.text = text.to_string();
        self.selected_text = selected_text.map(str::to_string);
        self.copied = false;
    }

    /// Append a line to the query text. Refused while executing.
    pub fn append_text(&mut self, text: &str) -> bool {
        if self.is_executing() {
            return false;
        }
        let appended = if self.text.is_empty() {
            text.to_string()
        } else {
            format!("{}\n{}", self.text, text)
        };
        self.replace_text(&appended, None);
        true
    }

    /// Enter `Executing`. Fails if an execution is already in flight.
    ///
    /// `text` may be a selection rather than the whole editor text; it is
    /// recorded in the history, the editor text is left alone.
    pub fn start_execution(
        &mut self,
        text: &str,
        is_default_select: bool,
        history_limit: Option<usize>,
    ) -> Result<ExecutionTicket, QueryError> {
        if self.is_executing() {
            return Err(QueryError::AlreadyExecuting(self.id));
        }

        let ticket = ExecutionTicket(self.next_ticket);
        self.next_ticket += 1;

        self.status = QueryStatus::Executing;
        self.is_default_select = is_default_select;
        self.copied = false;
        self.in_flight = Some(ticket);
        self.history.push(HistoryEntry {
            text: text.to_string(),
            default_select: is_default_select,
            requested_at: Utc::now(),
        });
        if let Some(limit) = history_limit {
            let overflow = self.history.len().saturating_sub(limit);
            self.history.drain(..overflow);
        }

        Ok(ticket)
    }

    /// Settle with rows from the connection. The query keeps its own copy.
    pub fn complete_success(&mut self, ticket: ExecutionTicket, remote: &Arc<ResultSet>) -> Settlement {
        if !self.take_ticket(ticket) {
            return Settlement::Stale;
        }
        self.result = Some(ResultSet::detached_copy(remote));
        self.error = None;
        self.status = QueryStatus::Success;
        Settlement::Applied
    }

    /// Settle with an error. The previous result stays in place.
    pub fn complete_failure(&mut self, ticket: ExecutionTicket, error: ExecutionError) -> Settlement {
        if !self.take_ticket(ticket) {
            return Settlement::Stale;
        }
        self.error = Some(error);
        self.status = QueryStatus::Failed;
        Settlement::Applied
    }

    /// Flag a finished clipboard copy. No-op while the query is executing.
    pub(crate) fn mark_copied(&mut self) -> bool {
        if self.is_executing() {
            return false;
        }
        self.copied = true;
        true
    }

    /// Props the graph surface compares between renders
    pub fn render_props(&self, has_graph_selection: bool) -> RenderProps {
        RenderProps {
            is_executing: self.is_executing(),
            query_text: self.text.clone(),
            copied: self.copied,
            has_selection: has_graph_selection,
        }
    }

    fn take_ticket(&mut self, ticket: ExecutionTicket) -> bool {
        if self.in_flight != Some(ticket) {
            debug!("Query {} dropped stale completion {:?}", self.id, ticket);
            return false;
        }
        self.in_flight = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn rows(value: i64) -> Arc<ResultSet> {
        Arc::new(ResultSet::new(vec![record! { "x" => value }]))
    }

    #[test]
    fn test_new_query_is_idle() {
        let query = Query::new(QueryId(3), "sales");
        assert_eq!(query.status(), QueryStatus::Idle);
        assert_eq!(query.name, "Query #3");
        assert!(query.result().is_none());
        assert!(query.error().is_none());
    }

    #[test]
    fn test_success_transition() {
        let mut query = Query::new(QueryId(1), "db");
        let ticket = query.start_execution("SELECT 1", false, None).unwrap();
        assert!(query.is_executing());

        assert_eq!(query.complete_success(ticket, &rows(1)), Settlement::Applied);
        assert_eq!(query.status(), QueryStatus::Success);
        assert_eq!(query.result().unwrap().rows, vec![record! { "x" => 1 }]);
        assert!(query.in_flight().is_none());
    }

    #[test]
    fn test_second_start_refused_while_executing() {
        let mut query = Query::new(QueryId(1), "db");
        query.start_execution("SELECT 1", false, None).unwrap();

        let second = query.start_execution("SELECT 2", false, None);
        assert_eq!(second, Err(QueryError::AlreadyExecuting(QueryId(1))));
        assert_eq!(query.history().len(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut query = Query::new(QueryId(1), "db");
        let first = query.start_execution("SELECT 1", false, None).unwrap();
        query.complete_success(first, &rows(1));

        let second = query.start_execution("SELEC", false, None).unwrap();
        assert!(query.result().is_some());
        query.complete_failure(second, ExecutionError::Database("syntax error".to_string()));

        assert_eq!(query.status(), QueryStatus::Failed);
        assert_eq!(query.result().unwrap().rows, vec![record! { "x" => 1 }]);
        assert!(query.error().is_some());
    }

    #[test]
    fn test_success_clears_error() {
        let mut query = Query::new(QueryId(1), "db");
        let first = query.start_execution("bad", false, None).unwrap();
        query.complete_failure(first, ExecutionError::Database("boom".to_string()));

        let second = query.start_execution("SELECT 1", false, None).unwrap();
        assert!(query.error().is_some());
        query.complete_success(second, &rows(1));
        assert!(query.error().is_none());
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut query = Query::new(QueryId(1), "db");
        let old = query.start_execution("SELECT 1", false, None).unwrap();
        query.complete_success(old, &rows(1));

        let current = query.start_execution("SELECT 2", false, None).unwrap();
        assert_eq!(query.complete_success(old, &rows(99)), Settlement::Stale);
        assert!(query.is_executing());
        assert_eq!(query.in_flight(), Some(current));

        query.complete_success(current, &rows(2));
        assert_eq!(query.result().unwrap().rows, vec![record! { "x" => 2 }]);
    }

    #[test]
    fn test_update_suppression() {
        let mut query = Query::new(QueryId(1), "db");
        assert!(query.update_text("SELECT 1", Some("1")));
        assert!(!query.update_text("SELECT 1", Some("1")));
        assert!(query.update_text("SELECT 1", None));

        query.start_execution("SELECT 1", false, None).unwrap();
        assert!(!query.update_text("SELECT 2", None));
        assert_eq!(query.text(), "SELECT 1");
    }

    #[test]
    fn test_append_text() {
        let mut query = Query::new(QueryId(1), "db");
        assert!(query.append_text("SELECT 1;"));
        assert!(query.append_text("SELECT 2;"));
        assert_eq!(query.text(), "SELECT 1;\nSELECT 2;");
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let mut query = Query::new(QueryId(1), "db");
        for i in 0..4 {
            let ticket = query
                .start_execution(&format!("SELECT {}", i), i == 0, Some(2))
                .unwrap();
            query.complete_success(ticket, &rows(i));
        }

        let texts: Vec<&str> = query.history().iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_copied_reset_by_execution() {
        let mut query = Query::new(QueryId(1), "db");
        query.mark_copied();
        assert!(query.render_props(false).copied);

        query.start_execution("SELECT 1", false, None).unwrap();
        assert!(!query.copied());
    }

    #[test]
    fn test_copy_ignored_while_executing() {
        let mut query = Query::new(QueryId(1), "db");
        query.start_execution("SELECT 1", false, None).unwrap();

        assert!(!query.mark_copied());
        assert!(!query.copied());
        assert!(!query.render_props(false).copied);
    }
}
