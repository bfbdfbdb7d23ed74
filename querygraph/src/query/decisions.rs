// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Derived-state decisions taken before a transition is requested

use super::Query;

/// Execution is refused only while the target query is executing. With no
/// target query there is nothing to guard.
pub fn should_execute_query(target: Option<&Query>) -> bool {
    match target {
        Some(query) => !query.is_executing(),
        None => true,
    }
}

/// Passive editor updates are refused while executing and when neither the
/// text nor the selection changed.
pub fn should_update_query(target: Option<&Query>, text: &str, selected_text: Option<&str>) -> bool {
    match target {
        Some(query) => query.should_update(text, selected_text),
        None => true,
    }
}

/// Whether a default select for `database` must open a new query instead of
/// overwriting `current`.
///
/// A new query is needed when the current one targets another database and
/// holds user text: non-blank and different from the proposed select. Blank
/// or already matching queries are safe to reuse.
pub fn needs_new_query(current: Option<&Query>, database: &str, default_select: &str) -> bool {
    let Some(current) = current else {
        return false;
    };

    let different_database = current.database != database;
    let not_default = current.text() != default_select;
    let not_empty = !current.text().trim().is_empty();

    different_database && not_default && not_empty
}
