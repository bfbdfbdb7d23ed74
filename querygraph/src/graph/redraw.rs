// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Redraw gating for the graph surface
//!
//! Rebuilding the graph (materialize + layout) is expensive, so it only
//! happens when new data arrived. Selection changes are applied in place.

/// The slice of UI state the graph surface reacts to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderProps {
    pub is_executing: bool,
    pub query_text: String,
    pub copied: bool,
    /// Whether a node or edge is currently selected
    pub has_selection: bool,
}

/// What the graph surface must do between two renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawDecision {
    /// Rebuild the graph from the result set
    Rebuild,
    /// Update selection state only
    Refresh,
    /// Nothing changed that the graph shows
    Skip,
}

impl RedrawDecision {
    pub fn needs_update(self) -> bool {
        !matches!(self, RedrawDecision::Skip)
    }
}

/// Decide how to move from `previous` to `next`.
///
/// A rebuild happens when an execution just settled, when the query text
/// changed, or when the copied flag turned on. Otherwise a newly non-empty
/// selection triggers a light refresh.
pub fn decide_redraw(previous: &RenderProps, next: &RenderProps) -> RedrawDecision {
    let execution_settled = previous.is_executing && !next.is_executing;
    let text_changed = previous.query_text != next.query_text;
    let copied_now = next.copied && !previous.copied;

    if execution_settled || text_changed || copied_now {
        return RedrawDecision::Rebuild;
    }

    if next.has_selection && !previous.has_selection {
        return RedrawDecision::Refresh;
    }

    RedrawDecision::Skip
}
