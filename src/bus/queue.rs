//! # Bounded stable priority queue of pending messages.
//!
//! ## Rules
//! - Kept sorted by **descending priority**; equal priorities keep insertion order.
//! - A new message is inserted before the first queued message of strictly lower priority.
//! - When full, the single lowest-priority pending message (the back of the queue) is
//!   evicted **before** inserting; the newly pushed message is never the one dropped.
//!
//! ```text
//! capacity = 2
//! push(p5) → [5]
//! push(p3) → [5, 3]
//! push(p8) → evict 3 → [8, 5]
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use super::Message;

pub(crate) struct PendingQueue {
    items: VecDeque<Arc<Message>>,
    capacity: usize,
}

impl PendingQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Inserts `msg` in priority order, returning the evicted message if the queue was full.
    pub(crate) fn push(&mut self, msg: Arc<Message>) -> Option<Arc<Message>> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_back()
        } else {
            None
        };

        let pos = self
            .items
            .iter()
            .position(|queued| queued.priority < msg.priority)
            .unwrap_or(self.items.len());
        self.items.insert(pos, msg);
        evicted
    }

    pub(crate) fn pop_front(&mut self) -> Option<Arc<Message>> {
        self.items.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes everything, returning how many messages were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<Message>> {
        self.items.iter().cloned().collect()
    }
}
