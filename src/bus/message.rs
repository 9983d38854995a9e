//! # Messages carried by the event bus.
//!
//! A [`Message`] is created by `publish`/`publish_sync` and shared as `Arc<Message>`
//! from then on, so it is immutable once created. Its priority is fixed at creation.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use termvisor::{PublishOptions, Target};
//!
//! let opts = PublishOptions::new()
//!     .priority(10)
//!     .ttl(Duration::from_millis(500))
//!     .target(Target::many(["status-bar", "logger"]))
//!     .meta("origin", "keyboard");
//! assert_eq!(opts.priority, 10);
//! ```

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tokio::time::Instant;

/// Unique message identifier (UUID v4 string).
pub type MessageId = String;

/// Recipient(s) of a targeted message, matched against subscriber ids and names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    One(String),
    Many(Vec<String>),
}

impl Target {
    /// Builds a multi-recipient target.
    pub fn many<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Target::Many(items.into_iter().map(Into::into).collect())
    }

    /// Iterates over recipients.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Target::One(one) => std::slice::from_ref(one),
            Target::Many(many) => many,
        };
        items.iter().map(String::as_str)
    }

    /// Returns true if the subscriber with this id or name is a recipient.
    pub fn addresses(&self, id: &str, name: &str) -> bool {
        self.iter().any(|t| t == id || t == name)
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::One(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::One(s)
    }
}

impl From<Vec<String>> for Target {
    fn from(v: Vec<String>) -> Self {
        Target::Many(v)
    }
}

/// Optional publishing parameters.
///
/// - `priority`: higher is more urgent (default `0`)
/// - `ttl`: maximum age before a pending message is discarded unread
/// - `target`: restrict delivery to the named subscribers (`None` = broadcast)
/// - `metadata`: free-form key/values, matchable by subscriber filters
#[derive(Clone, Debug, Default)]
pub struct PublishOptions {
    pub target: Option<Target>,
    pub priority: i32,
    pub ttl: Option<Duration>,
    pub metadata: HashMap<String, Value>,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn target(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One unit of published information.
#[derive(Clone, Debug)]
pub struct Message {
    /// Unique id.
    pub id: MessageId,
    /// Message type (e.g. `"input.key"`, `"navigation.changed"`).
    pub kind: String,
    /// Opaque payload.
    pub data: Value,
    /// Publisher identifier.
    pub source: String,
    /// Optional recipients (`None` = broadcast).
    pub target: Option<Target>,
    /// Wall-clock creation time.
    pub timestamp: SystemTime,
    /// Higher = more urgent.
    pub priority: i32,
    /// Optional time-to-live.
    pub ttl: Option<Duration>,
    pub metadata: HashMap<String, Value>,
    /// Monotonic creation instant, used for TTL and latency.
    pub(crate) created: Instant,
}

impl Message {
    pub(crate) fn new(
        kind: impl Into<String>,
        data: Value,
        source: impl Into<String>,
        opts: PublishOptions,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: kind.into(),
            data,
            source: source.into(),
            target: opts.target,
            timestamp: SystemTime::now(),
            priority: opts.priority,
            ttl: opts.ttl,
            metadata: opts.metadata,
            created: Instant::now(),
        }
    }

    /// Age of the message at `now`.
    #[inline]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }

    /// Whether the message outlived its TTL at `now` (age strictly greater than TTL).
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.ttl.is_some_and(|ttl| self.age(now) > ttl)
    }
}
