//! # Message filters.
//!
//! A [`MessageFilter`] narrows what a subscriber receives (and what
//! [`EventBus::message_history`](crate::EventBus::message_history) returns).
//! Every constraint that is set must hold; unset constraints match everything.
//!
//! | Constraint   | Matches when                                               |
//! |--------------|------------------------------------------------------------|
//! | `types`      | message kind is in the set                                 |
//! | `sources`    | message source is in the set                               |
//! | `targets`    | message has a target and one of its recipients is in set   |
//! | priority     | `min <= priority <= max` (each bound optional, inclusive)  |
//! | `metadata`   | every listed key is present with an equal value            |
//!
//! ## Example
//! ```rust
//! use termvisor::MessageFilter;
//!
//! let f = MessageFilter::new().kind("alert").min_priority(5);
//! assert!(f.min_priority == Some(5));
//! ```

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::Message;

/// Subscriber-side delivery constraints.
#[derive(Clone, Debug, Default)]
pub struct MessageFilter {
    pub types: Option<HashSet<String>>,
    pub sources: Option<HashSet<String>>,
    pub targets: Option<HashSet<String>>,
    pub min_priority: Option<i32>,
    pub max_priority: Option<i32>,
    pub metadata: HashMap<String, Value>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept messages of this kind (may be called repeatedly).
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.types.get_or_insert_with(HashSet::new).insert(kind.into());
        self
    }

    /// Accept messages from this source (may be called repeatedly).
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.sources
            .get_or_insert_with(HashSet::new)
            .insert(source.into());
        self
    }

    /// Accept targeted messages addressed to this recipient (may be called repeatedly).
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets
            .get_or_insert_with(HashSet::new)
            .insert(target.into());
        self
    }

    pub fn min_priority(mut self, min: i32) -> Self {
        self.min_priority = Some(min);
        self
    }

    pub fn max_priority(mut self, max: i32) -> Self {
        self.max_priority = Some(max);
        self
    }

    /// Require metadata `key` to equal `value`.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks all configured constraints against `msg`.
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(types) = &self.types {
            if !types.contains(&msg.kind) {
                return false;
            }
        }
        if let Some(sources) = &self.sources {
            if !sources.contains(&msg.source) {
                return false;
            }
        }
        if let Some(targets) = &self.targets {
            let hit = msg
                .target
                .as_ref()
                .is_some_and(|t| t.iter().any(|r| targets.contains(r)));
            if !hit {
                return false;
            }
        }
        if self.min_priority.is_some_and(|min| msg.priority < min) {
            return false;
        }
        if self.max_priority.is_some_and(|max| msg.priority > max) {
            return false;
        }
        self.metadata
            .iter()
            .all(|(k, v)| msg.metadata.get(k) == Some(v))
    }
}
