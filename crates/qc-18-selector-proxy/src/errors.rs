//! # Error Types
//!
//! All error types for selector routing and dispatch.

use crate::domain::value_objects::{Address, Bytes, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PROXY ERRORS
// =============================================================================

/// Errors surfaced by the proxy to the original caller.
///
/// Every variant aborts the whole invocation: no table mutation and no
/// value transfer survives a failed call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// Caller is not the admin.
    #[error("unauthorized caller: {caller:?}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },

    /// Caller is not the single identity allowed for this selector.
    #[error("selector {selector} restricted to {allowed:?}, caller {caller:?} rejected")]
    RestrictedSelector {
        /// The restricted selector.
        selector: Selector,
        /// The rejected caller.
        caller: Address,
        /// The only identity allowed to call `selector`.
        allowed: Address,
    },

    /// No target is bound to the selector.
    #[error("no route for selector {0}")]
    RouteNotFound(Selector),

    /// A null identity or malformed input was supplied where disallowed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The routed facet reported a failure. Relayed unmodified.
    #[error("target failure: {0}")]
    TargetFailure(FacetFailure),

    /// The selector is routed, but nothing is deployed at the target.
    #[error("selector {selector} routed to {target:?} but no facet is deployed there")]
    TargetNotDeployed {
        /// The routed selector.
        selector: Selector,
        /// The bound target address.
        target: Address,
    },
}

impl ProxyError {
    /// Returns true for both admin and per-selector authorization failures.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::RestrictedSelector { .. }
        )
    }

    /// Short, stable label used for metrics and structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } | Self::RestrictedSelector { .. } => "unauthorized",
            Self::RouteNotFound(_) => "route_not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::TargetFailure(_) => "target_failure",
            Self::TargetNotDeployed { .. } => "target_not_deployed",
        }
    }
}

impl From<FacetFailure> for ProxyError {
    fn from(failure: FacetFailure) -> Self {
        Self::TargetFailure(failure)
    }
}

// =============================================================================
// FACET FAILURE
// =============================================================================

/// Failure reported by a facet, including its structured payload.
#[derive(Debug, Error, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[error("{reason}")]
pub struct FacetFailure {
    /// Human readable reason.
    pub reason: String,
    /// Structured failure payload (ABI-encoded error, for example).
    pub data: Bytes,
}

impl FacetFailure {
    /// Failure with a reason and no payload.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            data: Bytes::new(),
        }
    }

    /// Failure with a reason and a structured payload.
    #[must_use]
    pub fn with_data(reason: impl Into<String>, data: Bytes) -> Self {
        Self {
            reason: reason.into(),
            data,
        }
    }
}

impl From<ProxyError> for FacetFailure {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::TargetFailure(inner) => inner,
            other => Self::new(other.to_string()),
        }
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors from configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// An environment variable could not be parsed.
    #[error("cannot parse {var}={value}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

// =============================================================================
// AUDIT SINK ERRORS
// =============================================================================

/// Errors from publishing audit records.
#[derive(Debug, Error, Clone)]
pub enum AuditSinkError {
    /// The sink could not accept the record.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    /// The record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================
