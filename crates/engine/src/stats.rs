//! Shared atomic counters between the sender and receiver loops (spec §3
//! "Counters", §5 "Shared state"). `pkts_sent` doubles as the rate-limit
//! token: the sender busy-waits while it stays at or above `max_rate - 1`,
//! and the 1 Hz ticker releases the sender by resetting it to zero.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[derive(Default)]
pub struct ScanStats {
    pkts_sent: AtomicU32,
    pkts_recv: AtomicU32,
    total_sent: AtomicU64,
    total_recv: AtomicU64,
}

impl ScanStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `pkts_sent` and returns the pre-increment value, which the
    /// sender compares against `max_rate - 1` to decide whether to park.
    pub fn record_sent(&self) -> u32 {
        self.total_sent.fetch_add(1, Ordering::Relaxed);
        self.pkts_sent.fetch_add(1, Ordering::SeqCst)
    }

    pub fn record_recv(&self) {
        self.total_recv.fetch_add(1, Ordering::Relaxed);
        self.pkts_recv.fetch_add(1, Ordering::SeqCst);
    }

    /// Current `pkts_sent` without mutating it, for the sender's busy-wait.
    pub fn sent_this_tick(&self) -> u32 {
        self.pkts_sent.load(Ordering::SeqCst)
    }

    /// Atomically swaps both counters to zero, returning the values that
    /// accumulated over the tick that just ended.
    pub fn tick(&self) -> (u32, u32) {
        (
            self.pkts_sent.swap(0, Ordering::SeqCst),
            self.pkts_recv.swap(0, Ordering::SeqCst),
        )
    }

    #[must_use]
    pub fn totals(&self) -> (u64, u64) {
        (
            self.total_sent.load(Ordering::Relaxed),
            self.total_recv.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_resets_to_zero_and_returns_prior_counts() {
        let stats = ScanStats::new();
        stats.record_sent();
        stats.record_sent();
        stats.record_recv();
        let (sent, recv) = stats.tick();
        assert_eq!((sent, recv), (2, 1));
        assert_eq!(stats.tick(), (0, 0));
    }

    #[test]
    fn totals_survive_ticks() {
        let stats = ScanStats::new();
        stats.record_sent();
        stats.tick();
        stats.record_sent();
        assert_eq!(stats.totals(), (2, 0));
    }

    #[test]
    fn record_sent_returns_pre_increment_value() {
        let stats = ScanStats::new();
        assert_eq!(stats.record_sent(), 0);
        assert_eq!(stats.record_sent(), 1);
    }
}
