//! # QC-18 Selector Proxy - Upgradeable Call Routing Subsystem
//!
//! **Subsystem ID:** 18
//! **Status:** Production-Ready (Phase 3)
//!
//! ## Purpose
//!
//! A stable entry identity whose behavior is supplied by swappable facets.
//! Every call names a 4-byte selector; the proxy looks the selector up in
//! its routing table and runs the bound facet against the proxy's own
//! storage and balance. Routes can be added, replaced or removed at any
//! time by the admin without changing the proxy's identity or state.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Admin Never Null | `domain/admin.rs` - `AdminRegistry::change()`, `router/dispatch.rs` post-run check |
//! | INVARIANT-2 | Route Read-Back | `domain/invariants.rs` - `check_route_invariant()` |
//! | INVARIANT-3 | Deposit Exactness | `router/journal.rs` - `StateJournal::credit()` |
//! | INVARIANT-4 | Failure Leaves No Trace | `router/proxy.rs` - journal committed only on success |
//!
//! ## Authorization
//!
//! | Entrypoint | Who may call |
//! |------------|--------------|
//! | `sharp_cut`, `restrict`, `change_admin` | admin (or the proxy itself with `allow_self_admin`) |
//! | routed selector | anyone, unless restricted to a single caller |
//! | bare deposit | anyone |
//!
//! ## Storage Layout
//!
//! | Data | Slot |
//! |------|------|
//! | Admin | `keccak256("eip1967.proxy.admin") - 1` |
//! | Route of `s` | `keccak256(s ‖ base("qc.selector-proxy.selectors"))` |
//! | Restriction of `s` | `keccak256(s ‖ base("qc.selector-proxy.restrictions"))` |
//!
//! Facets share this slot space. A routed facet is trusted with all of it.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | `SelectorProxy` | `router/proxy.rs` | Owns committed state, applies commits |
//! | `DispatchEngine` | `router/dispatch.rs` | Route, authorize, run |
//! | `StateJournal` | `router/journal.rs` | Per-invocation write overlay |
//! | `ProxyContext` | `router/context.rs` | What a facet sees |
//! | `SelectorProxyService` | `service.rs` | Async wrapper, audit forwarding |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_selector_proxy::prelude::*;
//!
//! let service = create_test_service(proxy_address, admin)?;
//! service.facets().deploy(v1_address, Arc::new(v1));
//! service.sharp_cut(admin, selector, v1_address).await?;
//!
//! let outcome = service.invoke(Invocation::call(user, selector, &args)).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod router;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AdminCall, AuditRecord, DispatchOutcome, Invocation, Log, StateChange,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Address, Bytes, Hash, Selector, StorageKey, StorageValue, U256,
    };

    // Domain services
    pub use crate::domain::services::{keccak256, mapping_slot, namespaced_slot, ADMIN_SLOT};

    // Admin, tables, configuration
    pub use crate::domain::admin::{AdminPolicy, AdminRegistry};
    pub use crate::domain::config::ProxyConfig;
    pub use crate::domain::storage::{Commit, ProxyStorage, StateStore};
    pub use crate::domain::tables::{RestrictionTable, SelectorTable};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::SelectorProxyApi;
    pub use crate::ports::outbound::{AuditSink, Facet, FacetResolver};

    // Router
    pub use crate::router::{DispatchEngine, ProxyContext, SelectorProxy, StateJournal};

    // Events
    pub use crate::events::{
        topics, AdminRequestPayload, AdminResponsePayload, AuditEventPayload,
        InvokeRequestPayload, InvokeResponsePayload,
    };

    // Errors
    pub use crate::errors::{AuditSinkError, ConfigError, FacetFailure, ProxyError};

    // Adapters
    pub use crate::adapters::{
        FnFacet, InMemoryAuditSink, InMemoryFacetRegistry, SelectorProxyEventHandler,
        TracingAuditSink,
    };

    // Service
    pub use crate::service::{
        create_test_service, SelectorProxyService, ServiceConfig, ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID for IPC.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Selector Proxy";

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_id() {
        assert_eq!(SUBSYSTEM_ID, 18);
    }

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = ProxyConfig::default();
        let _ = Address::ZERO;
        let _ = Selector::from_u32(0);
    }
}
