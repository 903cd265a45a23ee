//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the Selector Proxy to the rest of the node.
//!
//! - `facet_registry`: where facets are deployed
//! - `audit_sink`: where committed audit records go
//! - `event_handler`: bus payloads to the driving port

pub mod audit_sink;
pub mod event_handler;
pub mod facet_registry;

pub use audit_sink::*;
pub use event_handler::*;
pub use facet_registry::*;
