//! # Ports Layer
//!
//! Hexagonal architecture ports for the Selector Proxy subsystem.
//!
//! - `inbound`: Driving ports (API) - what the proxy exposes
//! - `outbound`: Driven ports (SPI) - facets, facet resolution, audit sinks

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
