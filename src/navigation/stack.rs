//! # Bounded navigation history.
//!
//! [`NavigationStack`] is a LIFO of [`NavigationEntry`] values with a fixed capacity.
//! Pushing onto a full stack evicts the **oldest** entries so that the length never
//! exceeds `max_size`.
//!
//! ```text
//! max_size = 5
//! push view1..view7 → [view3, view4, view5, view6, view7]
//!                       ^ bottom                    ^ top
//! ```

use std::collections::VecDeque;
use std::time::SystemTime;

use serde_json::Value;

/// Opaque snapshot produced by a view's `save_state` hook.
pub type ViewState = Value;

/// One visit to a view.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationEntry {
    pub view_id: String,
    pub params: Value,
    pub state: Option<ViewState>,
    pub timestamp: SystemTime,
}

impl NavigationEntry {
    pub fn new(view_id: impl Into<String>, params: Option<Value>, state: Option<ViewState>) -> Self {
        Self {
            view_id: view_id.into(),
            params: params.unwrap_or(Value::Null),
            state,
            timestamp: SystemTime::now(),
        }
    }
}

/// Capacity-bounded navigation stack.
#[derive(Clone, Debug)]
pub struct NavigationStack {
    entries: VecDeque<NavigationEntry>,
    max_size: usize,
}

impl NavigationStack {
    /// Creates an empty stack; `max_size` is clamped to at least 1.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size.min(64)),
            max_size,
        }
    }

    /// Pushes a new top entry, returning how many old entries were evicted.
    pub fn push(
        &mut self,
        view_id: impl Into<String>,
        params: Option<Value>,
        state: Option<ViewState>,
    ) -> usize {
        self.entries
            .push_back(NavigationEntry::new(view_id, params, state));
        let mut evicted = 0;
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn pop(&mut self) -> Option<NavigationEntry> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&NavigationEntry> {
        self.entries.back()
    }

    /// Entry just below the top (the target of a back navigation).
    pub fn previous(&self) -> Option<&NavigationEntry> {
        self.entries.len().checked_sub(2).and_then(|i| self.entries.get(i))
    }

    /// Replaces the top entry (pushes when empty); returns the replaced entry.
    pub fn replace(
        &mut self,
        view_id: impl Into<String>,
        params: Option<Value>,
        state: Option<ViewState>,
    ) -> Option<NavigationEntry> {
        let old = self.entries.pop_back();
        self.entries
            .push_back(NavigationEntry::new(view_id, params, state));
        old
    }

    /// True iff there is an entry to go back to.
    pub fn can_go_back(&self) -> bool {
        self.entries.len() >= 2
    }

    /// Most recent entry for `view_id`.
    pub fn find_entry(&self, view_id: &str) -> Option<&NavigationEntry> {
        self.entries.iter().rev().find(|e| e.view_id == view_id)
    }

    /// Removes every entry for `view_id`, returning how many were removed.
    pub fn remove_view(&mut self, view_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.view_id != view_id);
        before - self.entries.len()
    }

    /// Independent copy of the entries, bottom first.
    pub fn history(&self) -> Vec<NavigationEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Attaches a saved snapshot to the top entry.
    pub(crate) fn set_top_state(&mut self, state: Option<ViewState>) {
        if let Some(top) = self.entries.back_mut() {
            top.state = state;
        }
    }
}
