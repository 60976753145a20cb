use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Process-wide request counters reported by `/health`.
pub struct ServiceMetrics {
    started: Instant,
    /// Milliseconds since `started` when the last non-health-check request finished.
    last_request_ms: AtomicU64,
    requests_total: AtomicU64,
    active_streams: AtomicUsize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub idle_seconds: u64,
    pub requests_total: u64,
    pub active_streams: usize,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_request_ms: AtomicU64::new(0),
            requests_total: AtomicU64::new(0),
            active_streams: AtomicUsize::new(0),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark the service as used just now; `idle_seconds` counts from here.
    pub fn record_activity(&self) {
        self.last_request_ms.store(self.elapsed_ms(), Ordering::Relaxed);
    }

    pub fn stream_opened(&self) {
        self.active_streams.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stream_closed(&self) {
        // saturating: a mismatched close must not wrap the counter
        let _ = self
            .active_streams
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = self.elapsed_ms();
        let last = self.last_request_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            uptime_seconds: now / 1000,
            idle_seconds: now.saturating_sub(last) / 1000,
            requests_total: self.requests_total.load(Ordering::Relaxed),
            active_streams: self.active_streams.load(Ordering::Relaxed),
        }
    }
}
