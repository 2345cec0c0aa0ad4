//! Metrics registry
//!
//! - Counters only, monotonic
//! - One registry per indexed collection
//! - Relaxed atomics; exact once the collection is quiescent

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one indexed collection
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Completed index builds
    index_builds: AtomicU64,
    /// Records indexed across all builds
    records_indexed: AtomicU64,
    /// Queries that produced a result
    queries_executed: AtomicU64,
    /// Queries refused or failed
    queries_rejected: AtomicU64,
    /// Exact text lookups on values absent from the index
    unknown_values: AtomicU64,
    /// Group queries that produced a result
    group_queries: AtomicU64,
    /// Groups emitted by group queries
    groups_emitted: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed build of `records` records
    pub fn record_index_build(&self, records: u64) {
        self.index_builds.fetch_add(1, Ordering::Relaxed);
        self.records_indexed.fetch_add(records, Ordering::Relaxed);
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unknown_values(&self) {
        self.unknown_values.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed group query emitting `groups` groups
    pub fn record_group_query(&self, groups: u64) {
        self.group_queries.fetch_add(1, Ordering::Relaxed);
        self.groups_emitted.fetch_add(groups, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            index_builds: self.index_builds.load(Ordering::Relaxed),
            records_indexed: self.records_indexed.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            unknown_values: self.unknown_values.load(Ordering::Relaxed),
            group_queries: self.group_queries.load(Ordering::Relaxed),
            groups_emitted: self.groups_emitted.load(Ordering::Relaxed),
        }
    }

    /// Current snapshot as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub index_builds: u64,
    pub records_indexed: u64,
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub unknown_values: u64,
    pub group_queries: u64,
    pub groups_emitted: u64,
}
