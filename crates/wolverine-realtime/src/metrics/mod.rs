//! Realtime engine metrics.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters. Diagnostics only; nothing reads them for control flow.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    /// Signed: a superseded connection can be counted closed before its
    /// own open is recorded.
    connections_active: AtomicI64,
    connections_superseded: AtomicU64,
    events_received: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
    events_rejected: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection was registered.
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was cleaned up.
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// A connection was replaced by a newer one for the same user.
    pub fn connection_superseded(&self) {
        self.connections_superseded.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound event parsed successfully.
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// An outbound event was queued on a connection.
    pub fn event_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// An event was dropped (recipient absent or queue full).
    pub fn event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound frame was rejected as malformed.
    pub fn event_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed).max(0) as u64,
            connections_superseded: self.connections_superseded.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_rejected: self.events_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_opened: u64,
    /// Connections currently registered in the pool
    pub connections_active: u64,
    /// Connections replaced by a newer one
    pub connections_superseded: u64,
    /// Inbound events accepted
    pub events_received: u64,
    /// Outbound events queued
    pub events_delivered: u64,
    /// Events with nowhere to go
    pub events_dropped: u64,
    /// Inbound frames rejected
    pub events_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_before_open_balances() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_closed();
        assert_eq!(metrics.snapshot().connections_active, 0);

        metrics.connection_opened();
        metrics.connection_opened();
        let snap = metrics.snapshot();
        assert_eq!(snap.connections_opened, 2);
        assert_eq!(snap.connections_active, 1);
    }
}
