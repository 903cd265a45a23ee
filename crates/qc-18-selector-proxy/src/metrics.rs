//! # Selector Proxy Metrics
//!
//! Prometheus metrics for routing and administration.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-selector-proxy = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `selector_proxy_dispatches_total` - Counter of invocations, labeled by outcome
//! - `selector_proxy_admin_mutations_total` - Counter of committed admin calls, labeled by operation
//! - `selector_proxy_deposits_total` - Counter of bare deposits
//! - `selector_proxy_audit_publish_failures_total` - Counter of audit records the sink rejected

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Invocations, labeled by outcome (`ok` or an error kind)
    pub static ref DISPATCHES: IntCounterVec = register_int_counter_vec!(
        "selector_proxy_dispatches_total",
        "Total number of invocations routed through the proxy",
        &["outcome"]
    )
    .expect("Failed to create DISPATCHES metric");

    /// Committed admin calls, labeled by operation
    pub static ref ADMIN_MUTATIONS: IntCounterVec = register_int_counter_vec!(
        "selector_proxy_admin_mutations_total",
        "Total number of committed admin operations",
        &["operation"]
    )
    .expect("Failed to create ADMIN_MUTATIONS metric");

    /// Bare deposits
    pub static ref DEPOSITS: IntCounter = register_int_counter!(
        "selector_proxy_deposits_total",
        "Total number of bare deposits accepted"
    )
    .expect("Failed to create DEPOSITS metric");

    /// Audit records the sink failed to accept
    pub static ref AUDIT_PUBLISH_FAILURES: IntCounter = register_int_counter!(
        "selector_proxy_audit_publish_failures_total",
        "Total number of audit records the sink rejected"
    )
    .expect("Failed to create AUDIT_PUBLISH_FAILURES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record an invocation outcome
#[cfg(feature = "metrics")]
pub fn record_dispatch(outcome: &str) {
    DISPATCHES.with_label_values(&[outcome]).inc();
}

/// Record a committed admin operation
#[cfg(feature = "metrics")]
pub fn record_admin_mutation(operation: &str) {
    ADMIN_MUTATIONS.with_label_values(&[operation]).inc();
}

/// Record a bare deposit
#[cfg(feature = "metrics")]
pub fn record_deposit() {
    DEPOSITS.inc();
}

/// Record an audit record the sink rejected
#[cfg(feature = "metrics")]
pub fn record_audit_publish_failure() {
    AUDIT_PUBLISH_FAILURES.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_dispatch(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_admin_mutation(_operation: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_deposit() {}

#[cfg(not(feature = "metrics"))]
pub fn record_audit_publish_failure() {}
