//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for selector routing.
//! NO I/O, NO async, NO facet execution.
//!
//! - `admin`: privileged controller in the EIP-1967 slot
//! - `tables`: selector → target and selector → allowed caller
//! - `storage`: the proxy-owned slot store every component reads and writes

pub mod admin;
pub mod config;
pub mod entities;
pub mod invariants;
pub mod services;
pub mod storage;
pub mod tables;
pub mod value_objects;

pub use admin::*;
pub use config::*;
pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use storage::*;
pub use tables::*;
pub use value_objects::*;
