//! # Ring buffer of delivered messages.
//!
//! Introspection only: history is never used for redelivery. Oldest entries are
//! evicted first once `capacity` is exceeded; capacity `0` disables history.

use std::collections::VecDeque;
use std::sync::Arc;

use super::{Message, MessageFilter};

pub(crate) struct History {
    buf: VecDeque<Arc<Message>>,
    capacity: usize,
}

impl History {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, msg: Arc<Message>) {
        if self.capacity == 0 {
            return;
        }
        while self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(msg);
    }

    /// Returns matching messages in delivery order, keeping only the most recent `limit`.
    pub(crate) fn query(
        &self,
        filter: Option<&MessageFilter>,
        limit: Option<usize>,
    ) -> Vec<Arc<Message>> {
        let mut out: Vec<Arc<Message>> = self
            .buf
            .iter()
            .filter(|m| filter.map_or(true, |f| f.matches(m)))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            let skip = out.len().saturating_sub(limit);
            out.drain(..skip);
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        self.buf.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::PublishOptions;

    fn msg(kind: &str) -> Arc<Message> {
        Arc::new(Message::new(
            kind,
            serde_json::Value::Null,
            "test",
            PublishOptions::default(),
        ))
    }

    #[test]
    fn evicts_oldest_first() {
        let mut h = History::new(2);
        h.push(msg("a"));
        h.push(msg("b"));
        h.push(msg("c"));
        let kinds: Vec<_> = h.query(None, None).iter().map(|m| m.kind.clone()).collect();
        assert_eq!(kinds, vec!["b", "c"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut h = History::new(0);
        h.push(msg("a"));
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn filter_then_limit_keeps_most_recent() {
        let mut h = History::new(10);
        for kind in ["key", "tick", "key", "key", "tick"] {
            h.push(msg(kind));
        }
        let filter = MessageFilter::new().kind("key");
        assert_eq!(h.query(Some(&filter), None).len(), 3);
        assert_eq!(h.query(Some(&filter), Some(2)).len(), 2);
        assert_eq!(h.query(None, Some(1))[0].kind, "tick");
    }
}
