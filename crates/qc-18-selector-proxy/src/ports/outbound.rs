//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the proxy depends on:
//! - Facets: the swappable implementation modules addressed by selector
//! - Facet resolution: which facet is deployed at a target address
//! - Audit publication: where committed audit records are forwarded

use crate::domain::entities::AuditRecord;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::{AuditSinkError, FacetFailure};
use crate::router::ProxyContext;
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// FACET
// =============================================================================

/// An implementation module bound to one or more selectors.
///
/// Facets own no state. Everything they read or write goes through the
/// [`ProxyContext`], which is backed by the proxy's own storage.
///
/// ## Contract
///
/// * `Ok(output)` commits every change made through the context and
///   relays `output` to the caller verbatim.
/// * `Err(failure)` discards every change and relays `failure` verbatim.
pub trait Facet: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "facet"
    }

    /// Run the facet against the proxy's state.
    fn invoke(&self, ctx: &mut ProxyContext<'_, '_>) -> Result<Bytes, FacetFailure>;
}

// =============================================================================
// FACET RESOLVER
// =============================================================================

/// Lookup of the facet deployed at a target address.
pub trait FacetResolver: Send + Sync {
    /// Facet at `address`, if one is deployed.
    fn resolve(&self, address: &Address) -> Option<Arc<dyn Facet>>;
}

// =============================================================================
// AUDIT SINK
// =============================================================================

/// Destination for committed audit records (event bus, log pipeline).
///
/// Records are published after the invocation has committed. A publishing
/// failure never rolls the invocation back; the record stays in the
/// proxy's own audit trail either way.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Publish one record.
    async fn publish(&self, record: &AuditRecord) -> Result<(), AuditSinkError>;
}

// =============================================================================
// TESTS
// =============================================================================
