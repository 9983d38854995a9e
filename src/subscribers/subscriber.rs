//! # Subscriber records held by the event bus.
//!
//! A [`Subscriber`] pairs a handler with its name, optional [`MessageFilter`],
//! activity flag and delivery counters. Records are owned by the bus and only
//! mutated inside its methods; callers observe them through [`SubscriberInfo`]
//! snapshots.

use std::sync::Arc;
use std::time::SystemTime;

use crate::bus::{Message, MessageFilter};
use crate::subscribers::HandlerRef;

/// Unique subscriber identifier (UUID v4 string).
pub type SubscriberId = String;

/// Registered listener.
pub(crate) struct Subscriber {
    pub(crate) id: SubscriberId,
    pub(crate) name: Arc<str>,
    pub(crate) filter: Option<MessageFilter>,
    pub(crate) handler: HandlerRef,
    pub(crate) active: bool,
    pub(crate) received: u64,
    pub(crate) errors: u64,
    pub(crate) last_received: Option<SystemTime>,
}

impl Subscriber {
    pub(crate) fn new(name: &str, handler: HandlerRef, filter: Option<MessageFilter>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: Arc::from(name),
            filter,
            handler,
            active: true,
            received: 0,
            errors: 0,
            last_received: None,
        }
    }

    /// Whether `msg` should be delivered to this subscriber.
    ///
    /// Checks, in order: activity flag, addressing (broadcast or id/name in target),
    /// then the optional filter.
    pub(crate) fn accepts(&self, msg: &Message) -> bool {
        if !self.active {
            return false;
        }
        if let Some(target) = &msg.target {
            if !target.addresses(&self.id, &self.name) {
                return false;
            }
        }
        self.filter.as_ref().map_or(true, |f| f.matches(msg))
    }

    pub(crate) fn record_delivery(&mut self, failed: bool) {
        self.received += 1;
        self.last_received = Some(SystemTime::now());
        if failed {
            self.errors += 1;
        }
    }

    pub(crate) fn info(&self) -> SubscriberInfo {
        SubscriberInfo {
            id: self.id.clone(),
            name: self.name.to_string(),
            active: self.active,
            received: self.received,
            errors: self.errors,
            last_received: self.last_received,
        }
    }
}

/// Read-only snapshot of a subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriberInfo {
    pub id: SubscriberId,
    pub name: String,
    pub active: bool,
    /// Messages delivered to the handler (including failed deliveries).
    pub received: u64,
    /// Deliveries that returned an error or panicked.
    pub errors: u64,
    pub last_received: Option<SystemTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{PublishOptions, Target};
    use crate::error::HandlerError;
    use crate::subscribers::HandlerFn;

    fn noop() -> HandlerRef {
        HandlerFn::arc(|_msg| async { Ok::<_, HandlerError>(()) })
    }

    fn msg(opts: PublishOptions) -> Message {
        Message::new("alert", serde_json::Value::Null, "test", opts)
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let sub = Subscriber::new("ui", noop(), None);
        assert!(sub.accepts(&msg(PublishOptions::default())));
    }

    #[test]
    fn targeted_message_matches_id_or_name() {
        let sub = Subscriber::new("ui", noop(), None);
        let by_name = msg(PublishOptions::new().target(Target::from("ui")));
        let by_id = msg(PublishOptions::new().target(Target::from(sub.id.as_str())));
        let other = msg(PublishOptions::new().target(Target::many(["logger", "metrics"])));
        assert!(sub.accepts(&by_name));
        assert!(sub.accepts(&by_id));
        assert!(!sub.accepts(&other));
    }

    #[test]
    fn inactive_subscriber_accepts_nothing() {
        let mut sub = Subscriber::new("ui", noop(), None);
        sub.active = false;
        assert!(!sub.accepts(&msg(PublishOptions::default())));
    }

    #[test]
    fn delivery_counters() {
        let mut sub = Subscriber::new("ui", noop(), None);
        sub.record_delivery(false);
        sub.record_delivery(true);
        let info = sub.info();
        assert_eq!(info.received, 2);
        assert_eq!(info.errors, 1);
        assert!(info.last_received.is_some());
    }
}
