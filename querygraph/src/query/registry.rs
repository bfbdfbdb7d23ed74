// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Keyed collection of open queries with a current-query pointer

use log::debug;
use std::collections::BTreeMap;

use super::{Query, QueryId};
use crate::error::QueryError;

/// Open queries by id, plus the one currently shown.
///
/// The current id, when set, always names an entry. Entries are only added
/// by [`QueryRegistry::create`] and only dropped by [`QueryRegistry::remove`].
#[derive(Debug, Default)]
pub struct QueryRegistry {
    queries: BTreeMap<QueryId, Query>,
    current: Option<QueryId>,
    last_created: u64,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new query against `database` and make it current.
    pub fn create(&mut self, database: impl Into<String>) -> QueryId {
        self.last_created += 1;
        let id = QueryId(self.last_created);
        let query = Query::new(id, database);
        debug!("Created query {} for database '{}'", id, query.database);
        self.queries.insert(id, query);
        self.current = Some(id);
        id
    }

    pub fn select(&mut self, id: QueryId) -> Result<(), QueryError> {
        if !self.queries.contains_key(&id) {
            return Err(QueryError::NotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Remove a query. If it was current, the pointer is cleared and the
    /// caller picks the next one.
    pub fn remove(&mut self, id: QueryId) -> Result<Query, QueryError> {
        let query = self.queries.remove(&id).ok_or(QueryError::NotFound(id))?;
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(query)
    }

    pub fn get(&self, id: QueryId) -> Option<&Query> {
        self.queries.get(&id)
    }

    pub fn get_mut(&mut self, id: QueryId) -> Option<&mut Query> {
        self.queries.get_mut(&id)
    }

    pub fn require(&self, id: QueryId) -> Result<&Query, QueryError> {
        self.get(id).ok_or(QueryError::NotFound(id))
    }

    pub fn require_mut(&mut self, id: QueryId) -> Result<&mut Query, QueryError> {
        self.get_mut(id).ok_or(QueryError::NotFound(id))
    }

    pub fn current_id(&self) -> Option<QueryId> {
        self.current
    }

    pub fn current(&self) -> Option<&Query> {
        self.current.and_then(|id| self.queries.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Query> {
        match self.current {
            Some(id) => self.queries.get_mut(&id),
            None => None,
        }
    }

    /// Ids in creation order
    pub fn ids(&self) -> Vec<QueryId> {
        self.queries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.values()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_makes_query_current() {
        let mut registry = QueryRegistry::new();
        let first = registry.create("sales");
        let second = registry.create("hr");

        assert_eq!(first, QueryId(1));
        assert_eq!(second, QueryId(2));
        assert_eq!(registry.current_id(), Some(second));
        assert_eq!(registry.current().unwrap().database, "hr");
    }

    #[test]
    fn test_select_unknown_fails() {
        let mut registry = QueryRegistry::new();
        let id = registry.create("db");

        assert_eq!(registry.select(QueryId(42)), Err(QueryError::NotFound(QueryId(42))));
        assert_eq!(registry.current_id(), Some(id));
    }

    #[test]
    fn test_remove_current_clears_pointer() {
        let mut registry = QueryRegistry::new();
        let first = registry.create("db");
        let second = registry.create("db");

        let removed = registry.remove(second).unwrap();
        assert_eq!(removed.id(), second);
        assert_eq!(registry.current_id(), None);
        assert!(registry.current().is_none());

        registry.select(first).unwrap();
        assert_eq!(registry.current_id(), Some(first));
    }

    #[test]
    fn test_remove_other_keeps_current() {
        let mut registry = QueryRegistry::new();
        let first = registry.create("db");
        let second = registry.create("db");

        registry.remove(first).unwrap();
        assert_eq!(registry.current_id(), Some(second));
        assert_eq!(registry.remove(first).unwrap_err(), QueryError::NotFound(first));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut registry = QueryRegistry::new();
        let first = registry.create("db");
        registry.remove(first).unwrap();
        let next = registry.create("db");

        assert_ne!(first, next);
        assert_eq!(registry.ids(), vec![next]);
    }
}
