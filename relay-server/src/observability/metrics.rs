//! Metrics collection for relay
//!
//! Process-wide counters for failures the protocol never reports to
//! clients. Summarized in the log on shutdown.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use dashmap::DashMap;

/// Global metrics collector
pub struct Metrics {
    /// Total number of sessions registered
    pub sessions_opened_total: AtomicU64,
    /// Total number of sessions removed
    pub sessions_closed_total: AtomicU64,
    /// Total number of broadcasts started (including disconnect notices)
    pub broadcasts_total: AtomicU64,
    /// Total number of lines queued to a session
    pub deliveries_total: AtomicU64,
    /// Total number of deliveries that found the session's connection gone
    pub delivery_failures_total: AtomicU64,
    /// Total number of requests that fell through to the unrecognized branch
    pub unknown_requests_total: AtomicU64,
    /// Requests by wire tag
    pub requests_by_type: DashMap<String, AtomicU64>,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub broadcasts: u64,
    pub deliveries: u64,
    pub delivery_failures: u64,
    pub unknown_requests: u64,
    /// Requests by wire tag, sorted by tag
    pub requests_by_type: BTreeMap<String, u64>,
}

impl Metrics {
    fn new() -> Self {
        Self {
            sessions_opened_total: AtomicU64::new(0),
            sessions_closed_total: AtomicU64::new(0),
            broadcasts_total: AtomicU64::new(0),
            deliveries_total: AtomicU64::new(0),
            delivery_failures_total: AtomicU64::new(0),
            unknown_requests_total: AtomicU64::new(0),
            requests_by_type: DashMap::new(),
        }
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<Metrics> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    pub fn record_session_opened(&self) {
        self.sessions_opened_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_closed(&self) {
        self.sessions_closed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.broadcasts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery(&self) {
        self.deliveries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request by its wire tag
    ///
    /// Untagged input counts under `"<none>"`.
    pub fn record_request(&self, tag: Option<&str>) {
        self.requests_by_type
            .entry(tag.unwrap_or("<none>").to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_request(&self) {
        self.unknown_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_opened: self.sessions_opened_total.load(Ordering::Relaxed),
            sessions_closed: self.sessions_closed_total.load(Ordering::Relaxed),
            broadcasts: self.broadcasts_total.load(Ordering::Relaxed),
            deliveries: self.deliveries_total.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures_total.load(Ordering::Relaxed),
            unknown_requests: self.unknown_requests_total.load(Ordering::Relaxed),
            requests_by_type: self
                .requests_by_type
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sessions opened={} closed={}, broadcasts={}, deliveries={} failed={}, unknown requests={}",
            self.sessions_opened,
            self.sessions_closed,
            self.broadcasts,
            self.deliveries,
            self.delivery_failures,
            self.unknown_requests
        )?;

        for (tag, count) in &self.requests_by_type {
            write!(f, ", {}={}", tag, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global instance is shared by every test in the binary, so these
    // tests use private instances or only assert on increases.

    #[test]
    fn test_counters_increment() {
        let metrics = Metrics::new();
        metrics.record_session_opened();
        metrics.record_broadcast();
        metrics.record_delivery();
        metrics.record_delivery();
        metrics.record_delivery_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.sessions_opened, 1);
        assert_eq!(snap.broadcasts, 1);
        assert_eq!(snap.deliveries, 2);
        assert_eq!(snap.delivery_failures, 1);
        assert_eq!(snap.sessions_closed, 0);
    }

    #[test]
    fn test_requests_by_type() {
        let metrics = Metrics::new();
        metrics.record_request(Some("message"));
        metrics.record_request(Some("message"));
        metrics.record_request(None);

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_by_type.get("message"), Some(&2));
        assert_eq!(snap.requests_by_type.get("<none>"), Some(&1));
        assert_eq!(snap.requests_by_type.get("users"), None);
    }

    #[test]
    fn test_global_is_shared() {
        let before = Metrics::global().snapshot().unknown_requests;
        Metrics::global().record_unknown_request();
        assert!(Metrics::global().snapshot().unknown_requests > before);
    }

    #[test]
    fn test_snapshot_display() {
        let snap = MetricsSnapshot {
            sessions_opened: 3,
            ..MetricsSnapshot::default()
        };
        assert!(snap.to_string().starts_with("sessions opened=3 closed=0"));
    }

    #[test]
    fn test_snapshot_display_lists_requests() {
        let metrics = Metrics::new();
        metrics.record_request(Some("users"));
        metrics.record_request(Some("message"));
        metrics.record_request(Some("message"));

        let summary = metrics.snapshot().to_string();
        assert!(summary.ends_with("unknown requests=0, message=2, users=1"));
    }
}
