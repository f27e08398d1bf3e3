//! Observability and Metrics
//!
//! Counters for the request pipeline, shared between the dispatcher and the
//! UDP server. Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for protocol operations
#[derive(Debug)]
pub struct Metrics {
    /// Datagrams received
    pub datagrams_received: AtomicU64,
    /// Replies sent
    pub replies_sent: AtomicU64,
    /// Requests that reached a handler
    pub requests_handled: AtomicU64,
    /// Datagrams rejected as bad messages
    pub bad_packets: AtomicU64,
    /// Authenticated requests rejected as replays
    pub replays_rejected: AtomicU64,
    /// Total bytes received
    pub bytes_received: AtomicU64,
    /// Total bytes sent
    pub bytes_sent: AtomicU64,
    /// Socket errors
    pub io_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            datagrams_received: AtomicU64::new(0),
            replies_sent: AtomicU64::new(0),
            requests_handled: AtomicU64::new(0),
            bad_packets: AtomicU64::new(0),
            replays_rejected: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            io_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a received datagram
    pub fn datagram_received(&self, byte_count: u64) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a sent reply
    pub fn reply_sent(&self, byte_count: u64) {
        self.replies_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn request_handled(&self) {
        self.requests_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bad_packet(&self) {
        self.bad_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn replay_rejected(&self) {
        self.replays_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            replies_sent: self.replies_sent.load(Ordering::Relaxed),
            requests_handled: self.requests_handled.load(Ordering::Relaxed),
            bad_packets: self.bad_packets.load(Ordering::Relaxed),
            replays_rejected: self.replays_rejected.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            datagrams_received = snapshot.datagrams_received,
            replies_sent = snapshot.replies_sent,
            requests_handled = snapshot.requests_handled,
            bad_packets = snapshot.bad_packets,
            replays_rejected = snapshot.replays_rejected,
            bytes_received = snapshot.bytes_received,
            bytes_sent = snapshot.bytes_sent,
            io_errors = snapshot.io_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Gate server metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub datagrams_received: u64,
    pub replies_sent: u64,
    pub requests_handled: u64,
    pub bad_packets: u64,
    pub replays_rejected: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub io_errors: u64,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.datagram_received(40);
        metrics.datagram_received(2);
        metrics.reply_sent(42);
        metrics.bad_packet();
        metrics.replay_rejected();
        metrics.request_handled();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.datagrams_received, 2);
        assert_eq!(snapshot.bytes_received, 42);
        assert_eq!(snapshot.replies_sent, 1);
        assert_eq!(snapshot.bytes_sent, 42);
        assert_eq!(snapshot.bad_packets, 1);
        assert_eq!(snapshot.replays_rejected, 1);
        assert_eq!(snapshot.requests_handled, 1);
        assert_eq!(snapshot.io_errors, 0);
    }
}
