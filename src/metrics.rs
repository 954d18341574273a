// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for search-coordinator.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host process is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_coordinator_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: configure, maintain, delete, reindex, dispose
//! - `status`: success, error
//! - `outcome`: migration decision (enqueued, up_to_date, ...)

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a per-index lifecycle operation
pub fn record_index_operation(operation: &str, success: bool) {
    counter!(
        "search_coordinator_index_operations_total",
        "operation" => operation.to_string(),
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);
}

/// Record the outcome of a migration-detection pass for one index
pub fn record_migration_decision(outcome: &str) {
    counter!(
        "search_coordinator_migration_decisions_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record batch operation latency
pub fn record_batch_latency(operation: &str, duration: Duration) {
    histogram!(
        "search_coordinator_batch_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a query compilation
pub fn record_query_build(success: bool) {
    counter!(
        "search_coordinator_query_builds_total",
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);
}

/// Timer that records batch latency on drop
pub struct BatchTimer {
    operation: &'static str,
    start: Instant,
}

impl BatchTimer {
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for BatchTimer {
    fn drop(&mut self) {
        record_batch_latency(self.operation, self.start.elapsed());
    }
}
