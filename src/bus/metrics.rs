use std::time::Duration;

/// Running counters kept inside the bus state.
#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) published: u64,
    pub(crate) processed: u64,
    pub(crate) dropped: u64,
    pub(crate) errors: u64,
    pub(crate) total_latency: Duration,
}

impl Counters {
    pub(crate) fn record_processed(&mut self, latency: Duration) {
        self.processed += 1;
        self.total_latency = self.total_latency.saturating_add(latency);
    }

    pub(crate) fn avg_latency(&self) -> Duration {
        match u32::try_from(self.processed) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_latency / n,
            Err(_) => self.total_latency.div_f64(self.processed as f64),
        }
    }
}

/// Point-in-time snapshot of bus activity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusMetrics {
    /// Messages accepted by `publish`/`publish_sync`.
    pub published: u64,
    /// Messages that went through delivery (matched or not).
    pub processed: u64,
    /// Messages discarded: expired, evicted on overflow, or published after `destroy`.
    pub dropped: u64,
    /// Failed handler invocations.
    pub errors: u64,
    /// Mean time spent delivering one message to its subscribers.
    pub avg_latency: Duration,
    pub queue_size: usize,
    pub history_size: usize,
    pub subscribers: usize,
    pub active_subscribers: usize,
    pub paused: bool,
    pub processing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_latency() {
        let mut c = Counters::default();
        assert_eq!(c.avg_latency(), Duration::ZERO);
        c.record_processed(Duration::from_millis(10));
        c.record_processed(Duration::from_millis(30));
        assert_eq!(c.avg_latency(), Duration::from_millis(20));
    }
}
