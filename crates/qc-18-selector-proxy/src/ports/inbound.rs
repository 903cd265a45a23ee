//! # Driving Ports (API - Inbound)
//!
//! The public surface of the selector proxy. Every entrypoint takes the
//! identity of the immediate caller explicitly; the proxy never infers it.
//!
//! ## Entrypoints
//!
//! | Operation | Authorization | Audit |
//! |-----------|---------------|-------|
//! | `sharp_cut` | admin | `RouteChanged` |
//! | `restrict` | admin | none |
//! | `change_admin` | admin | `AdminChanged` |
//! | `get_*` / `balance` | none | none |
//! | `invoke` / `deposit` | per-selector restriction | whatever the facet does |

use crate::domain::entities::{DispatchOutcome, Invocation};
use crate::domain::value_objects::{Address, Selector, U256};
use crate::errors::ProxyError;
use async_trait::async_trait;

/// Primary API for the Selector Proxy subsystem.
#[async_trait]
pub trait SelectorProxyApi: Send + Sync {
    /// Bind, rebind or unbind (`target = ZERO`) a selector.
    ///
    /// Returns the previous target.
    async fn sharp_cut(
        &self,
        caller: Address,
        selector: Selector,
        target: Address,
    ) -> Result<Address, ProxyError>;

    /// Restrict a selector to a single caller, or lift the restriction
    /// (`allowed = ZERO`).
    ///
    /// Returns the previous restriction.
    async fn restrict(
        &self,
        caller: Address,
        selector: Selector,
        allowed: Address,
    ) -> Result<Address, ProxyError>;

    /// Hand control of the proxy to `new_admin`.
    ///
    /// Returns the previous admin.
    async fn change_admin(&self, caller: Address, new_admin: Address)
        -> Result<Address, ProxyError>;

    /// Current target of `selector` (ZERO when unrouted).
    async fn get_target(&self, selector: Selector) -> Result<Address, ProxyError>;

    /// Current restriction of `selector` (ZERO when open).
    async fn get_restriction(&self, selector: Selector) -> Result<Address, ProxyError>;

    /// Current admin.
    async fn get_admin(&self) -> Result<Address, ProxyError>;

    /// Value held by the proxy.
    async fn balance(&self) -> Result<U256, ProxyError>;

    /// The default entrypoint: route an invocation to its facet.
    async fn invoke(&self, invocation: Invocation) -> Result<DispatchOutcome, ProxyError>;

    /// Send value with no payload.
    async fn deposit(&self, caller: Address, value: U256) -> Result<DispatchOutcome, ProxyError> {
        self.invoke(Invocation::deposit(caller, value)).await
    }
}
