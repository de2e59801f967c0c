//! Store metrics.
//!
//! Metrics go through the `metrics` facade and are no-ops until the
//! embedding application installs a recorder. Every metric carries a
//! `store` label with the store's configured name.
//!
//! - Dispatches that reached the reducer
//! - Dispatches rejected because a reducer was running
//! - Listener notifications
//! - Reducer execution time

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Dispatches that ran the reducer successfully
pub const DISPATCH_TOTAL: &str = "store_dispatch_total";

/// Dispatches rejected because a reducer was already running
pub const DISPATCH_REJECTED_TOTAL: &str = "store_dispatch_rejected_total";

/// Individual listener calls
pub const LISTENERS_NOTIFIED_TOTAL: &str = "store_listeners_notified_total";

/// Reducer execution time, successful or not
pub const REDUCER_DURATION_SECONDS: &str = "reducer_execution_duration_seconds";

/// Register all metric descriptions with the installed recorder.
///
/// Call once after installing a recorder; without one this does nothing.
pub fn register_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of actions dispatched through a store");
    describe_counter!(
        DISPATCH_REJECTED_TOTAL,
        "Total number of dispatches rejected because a reducer was executing"
    );
    describe_counter!(
        LISTENERS_NOTIFIED_TOTAL,
        "Total number of listener calls after dispatch"
    );
    describe_histogram!(REDUCER_DURATION_SECONDS, "Time taken to execute reducers");
}

/// Store metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record a completed dispatch.
    pub fn record_dispatch(store: &str) {
        counter!(DISPATCH_TOTAL, "store" => store.to_string()).increment(1);
    }

    /// Record a dispatch rejected by the reentrancy guard.
    pub fn record_rejection(store: &str) {
        counter!(DISPATCH_REJECTED_TOTAL, "store" => store.to_string()).increment(1);
    }

    /// Record one notification pass.
    pub fn record_notified(store: &str, listeners: usize) {
        counter!(LISTENERS_NOTIFIED_TOTAL, "store" => store.to_string()).increment(listeners as u64);
    }

    /// Record a reducer execution.
    pub fn record_reducer(store: &str, duration: Duration) {
        histogram!(REDUCER_DURATION_SECONDS, "store" => store.to_string())
            .record(duration.as_secs_f64());
    }
}
