//! # Priority event bus.
//!
//! [`EventBus`] delivers [`Message`]s from publishers to subscribers with priority
//! ordering, filtering, TTL expiry and bounded-queue backpressure.
//!
//! ## Architecture
//! ```text
//! publish() ──► PendingQueue (desc priority, FIFO ties, bounded)
//!                   │  full? → drop lowest pending (MessageDropped "queue_full")
//!                   ▼
//!             drain loop (single drainer, guarded by an async lock)
//!                   ├─ batch of `batch_size` messages, then yield_now()
//!                   ├─ expired?  → MessageDropped "ttl_expired"
//!                   └─ deliver → subscribers in registration order
//!                                   └─ error/panic → counted + DeliveryError
//!                   ▼
//!               History (ring buffer, introspection only)
//!
//! publish_sync() ──► deliver immediately (bypasses the queue)
//! ```
//!
//! ## Rules
//! - Bus state sits behind a synchronous mutex that is **never held across `.await`**;
//!   every mutation is a discrete critical section.
//! - Only one drain runs at a time, so messages leave the queue strictly in order.
//! - Draining is scheduled on the ambient Tokio runtime by `publish`/`resume`. Without a
//!   runtime, messages wait until [`EventBus::flush`] is awaited.
//! - `pause()` stops draining after the message in flight; publishing keeps enqueuing.
//! - A handler may await [`EventBus::flush`] on its own bus (e.g. a quit message that runs
//!   shutdown). The flush then continues the enclosing drain in place instead of waiting
//!   for the drain lock it already holds.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};

use super::history::History;
use super::metrics::{BusMetrics, Counters};
use super::queue::PendingQueue;
use super::{Message, MessageFilter, MessageId, PublishOptions};
use crate::config::BusConfig;
use crate::error::HandlerError;
use crate::events::{Event, EventKind, Notifier};
use crate::isolate::isolate;
use crate::subscribers::{HandlerRef, Subscriber, SubscriberId, SubscriberInfo};

tokio::task_local! {
    /// Address of the bus whose drain lock the current task holds.
    static DRAINING: usize;
}

struct BusState {
    queue: PendingQueue,
    history: History,
    subscribers: Vec<Subscriber>,
    counters: Counters,
    paused: bool,
    /// A drain task has been spawned and has not yet observed an empty queue.
    scheduled: bool,
    /// Messages being delivered right now (drain and `publish_sync`).
    in_flight: usize,
    destroyed: bool,
}

/// In-process publish/subscribe hub with priority queueing.
pub struct EventBus {
    cfg: BusConfig,
    state: Mutex<BusState>,
    drain_lock: tokio::sync::Mutex<()>,
    notifier: Notifier,
    me: Weak<EventBus>,
}

impl EventBus {
    /// Creates a new bus. Notifications (`DeliveryError`, `MessageDropped`) go to `notifier`.
    pub fn new(cfg: BusConfig, notifier: Notifier) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            state: Mutex::new(BusState {
                queue: PendingQueue::new(cfg.queue_capacity()),
                history: History::new(cfg.max_history),
                subscribers: Vec::new(),
                counters: Counters::default(),
                paused: false,
                scheduled: false,
                in_flight: 0,
                destroyed: false,
            }),
            cfg,
            drain_lock: tokio::sync::Mutex::new(()),
            notifier,
            me: me.clone(),
        })
    }

    /// Registers a subscriber and returns its id. Always succeeds.
    pub fn subscribe(
        &self,
        name: &str,
        handler: HandlerRef,
        filter: Option<MessageFilter>,
    ) -> SubscriberId {
        let sub = Subscriber::new(name, handler, filter);
        let id = sub.id.clone();
        self.state.lock().subscribers.push(sub);
        debug!(subscriber = name, id = %id, "subscribed");
        id
    }

    /// Removes a subscriber; returns whether one existed.
    pub fn unsubscribe(&self, id: &str) -> bool {
        let mut st = self.state.lock();
        let before = st.subscribers.len();
        st.subscribers.retain(|s| s.id != id);
        let removed = st.subscribers.len() != before;
        if removed {
            debug!(id, "unsubscribed");
        }
        removed
    }

    /// Toggles a subscriber without removing it; returns whether it exists.
    pub fn set_active(&self, id: &str, active: bool) -> bool {
        let mut st = self.state.lock();
        match st.subscribers.iter_mut().find(|s| s.id == id) {
            Some(sub) => {
                sub.active = active;
                true
            }
            None => false,
        }
    }

    /// Snapshot of one subscriber.
    pub fn subscriber(&self, id: &str) -> Option<SubscriberInfo> {
        let st = self.state.lock();
        st.subscribers.iter().find(|s| s.id == id).map(Subscriber::info)
    }

    /// Snapshots of all subscribers, in registration order.
    pub fn subscribers(&self) -> Vec<SubscriberInfo> {
        self.state.lock().subscribers.iter().map(Subscriber::info).collect()
    }

    /// Enqueues a message for asynchronous delivery and returns its id.
    ///
    /// When the queue is full the lowest-priority pending message is dropped first;
    /// the message being published is always retained. On a destroyed bus the message
    /// is counted as dropped and never delivered.
    pub fn publish(
        &self,
        kind: impl Into<String>,
        data: Value,
        source: impl Into<String>,
        opts: PublishOptions,
    ) -> MessageId {
        let msg = Arc::new(Message::new(kind, data, source, opts));
        let id = msg.id.clone();

        let (evicted, schedule) = {
            let mut st = self.state.lock();
            if st.destroyed {
                st.counters.dropped += 1;
                drop(st);
                self.report_drop(&msg, "bus_destroyed");
                return id;
            }
            st.counters.published += 1;
            let evicted = st.queue.push(Arc::clone(&msg));
            if evicted.is_some() {
                st.counters.dropped += 1;
            }
            let schedule = !st.paused && !st.scheduled;
            if schedule {
                st.scheduled = true;
            }
            (evicted, schedule)
        };

        if let Some(old) = evicted {
            self.report_drop(&old, "queue_full");
        }
        if schedule {
            self.schedule_drain();
        }
        id
    }

    /// Delivers a message immediately to the current subscribers, bypassing the queue.
    ///
    /// Resolves once every matching handler has run.
    pub async fn publish_sync(
        &self,
        kind: impl Into<String>,
        data: Value,
        source: impl Into<String>,
        opts: PublishOptions,
    ) -> MessageId {
        let msg = Arc::new(Message::new(kind, data, source, opts));
        let id = msg.id.clone();
        {
            let mut st = self.state.lock();
            if st.destroyed {
                st.counters.dropped += 1;
                drop(st);
                self.report_drop(&msg, "bus_destroyed");
                return id;
            }
            st.counters.published += 1;
        }
        self.process(msg).await;
        id
    }

    /// Stops draining. Publishing while paused still enqueues.
    pub fn pause(&self) {
        let mut st = self.state.lock();
        if !st.paused {
            st.paused = true;
            debug!(pending = st.queue.len(), "bus paused");
        }
    }

    /// Restarts draining if messages are pending.
    pub fn resume(&self) {
        let schedule = {
            let mut st = self.state.lock();
            if !st.paused || st.destroyed {
                return;
            }
            st.paused = false;
            debug!(pending = st.queue.len(), "bus resumed");
            let schedule = !st.scheduled && !st.queue.is_empty();
            if schedule {
                st.scheduled = true;
            }
            schedule
        };
        if schedule {
            self.schedule_drain();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Drains pending messages in the caller's task until the queue is empty
    /// or the bus is paused.
    ///
    /// Called from a handler of this bus, it delivers the remaining messages in place.
    pub async fn flush(&self) {
        if self.holds_drain_lock() {
            self.drain_batches().await;
        } else {
            self.drain().await;
        }
    }

    /// Pending messages in delivery order.
    pub fn pending(&self) -> Vec<Arc<Message>> {
        self.state.lock().queue.snapshot()
    }

    /// Delivered messages in delivery order, optionally filtered and limited to the most
    /// recent `limit`.
    pub fn message_history(
        &self,
        filter: Option<&MessageFilter>,
        limit: Option<usize>,
    ) -> Vec<Arc<Message>> {
        self.state.lock().history.query(filter, limit)
    }

    pub fn clear_history(&self) {
        self.state.lock().history.clear();
    }

    pub fn metrics(&self) -> BusMetrics {
        let st = self.state.lock();
        BusMetrics {
            published: st.counters.published,
            processed: st.counters.processed,
            dropped: st.counters.dropped,
            errors: st.counters.errors,
            avg_latency: st.counters.avg_latency(),
            queue_size: st.queue.len(),
            history_size: st.history.len(),
            subscribers: st.subscribers.len(),
            active_subscribers: st.subscribers.iter().filter(|s| s.active).count(),
            paused: st.paused,
            processing: st.in_flight > 0,
        }
    }

    /// Drops all subscribers, pending messages and history. Later publishes are discarded.
    pub fn destroy(&self) {
        let mut st = self.state.lock();
        if st.destroyed {
            return;
        }
        st.destroyed = true;
        let discarded = st.queue.clear();
        st.subscribers.clear();
        st.history.clear();
        info!(discarded, "event bus destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Spawns a drain on the ambient runtime, if any.
    fn schedule_drain(&self) {
        let handle = tokio::runtime::Handle::try_current();
        match (handle, self.me.upgrade()) {
            (Ok(handle), Some(me)) => {
                handle.spawn(async move { me.drain().await });
            }
            _ => {
                self.state.lock().scheduled = false;
                debug!("no runtime available; pending messages wait for flush()");
            }
        }
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    fn holds_drain_lock(&self) -> bool {
        DRAINING.try_with(|key| *key == self.key()).unwrap_or(false)
    }

    async fn drain(&self) {
        let _guard = self.drain_lock.lock().await;
        DRAINING.scope(self.key(), self.drain_batches()).await;
    }

    /// Delivers pending messages in batches, yielding between batches.
    /// The caller holds `drain_lock`.
    async fn drain_batches(&self) {
        let batch = self.cfg.batch_size_clamped();

        'drain: loop {
            for _ in 0..batch {
                let next = {
                    let mut st = self.state.lock();
                    let next = if st.paused || st.destroyed {
                        None
                    } else {
                        st.queue.pop_front()
                    };
                    match next {
                        Some(msg) => msg,
                        None => {
                            st.scheduled = false;
                            break 'drain;
                        }
                    }
                };
                self.process(next).await;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Expiry check, delivery and bookkeeping for one message.
    async fn process(&self, msg: Arc<Message>) {
        let started = Instant::now();
        if msg.is_expired(started) {
            self.state.lock().counters.dropped += 1;
            self.report_drop(&msg, "ttl_expired");
            return;
        }

        self.state.lock().in_flight += 1;
        self.deliver(&msg).await;

        let mut st = self.state.lock();
        st.in_flight = st.in_flight.saturating_sub(1);
        st.counters.record_processed(started.elapsed());
        st.history.push(msg);
    }

    async fn deliver(&self, msg: &Arc<Message>) {
        let recipients: Vec<(SubscriberId, Arc<str>, HandlerRef)> = {
            let st = self.state.lock();
            st.subscribers
                .iter()
                .filter(|s| s.accepts(msg))
                .map(|s| (s.id.clone(), Arc::clone(&s.name), Arc::clone(&s.handler)))
                .collect()
        };

        for (id, name, handler) in recipients {
            let res = match isolate(handler.on_message(Arc::clone(msg))).await {
                Ok(res) => res,
                Err(info) => Err(HandlerError::Panicked { info }),
            };

            {
                let mut st = self.state.lock();
                if let Some(sub) = st.subscribers.iter_mut().find(|s| s.id == id) {
                    sub.record_delivery(res.is_err());
                }
                if res.is_err() {
                    st.counters.errors += 1;
                }
            }

            if let Err(err) = res {
                debug!(
                    subscriber = &*name,
                    message_id = %msg.id,
                    kind = %msg.kind,
                    err = %err,
                    "delivery error"
                );
                self.notifier.publish(
                    Event::new(EventKind::DeliveryError)
                        .with_subscriber(name)
                        .with_message(msg.id.as_str())
                        .with_reason(err.to_string()),
                );
            }
        }
    }

    fn report_drop(&self, msg: &Message, reason: &'static str) {
        debug!(message_id = %msg.id, kind = %msg.kind, priority = msg.priority, reason, "message dropped");
        self.notifier.publish(
            Event::new(EventKind::MessageDropped)
                .with_message(msg.id.as_str())
                .with_reason(reason),
        );
    }
}
