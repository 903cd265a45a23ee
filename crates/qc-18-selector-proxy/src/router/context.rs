//! # Proxy Context
//!
//! The handle a facet receives for the duration of one call. It exposes
//! the proxy's own storage, balance and admin entrypoints, so whatever a
//! facet writes lands in the proxy and nowhere else.
//!
//! ## Trust boundary
//!
//! Facets are trusted, not sandboxed. Through [`ProxyContext::sstore`] a
//! routed facet can overwrite any slot, including the admin slot and both
//! routing tables. The only guard the engine keeps is that an invocation
//! leaving the admin slot empty is rejected.

use crate::domain::entities::{AdminCall, Log};
use crate::domain::storage::StateStore;
use crate::domain::value_objects::{Address, Bytes, Hash, Selector, StorageKey, StorageValue, U256};
use crate::errors::{FacetFailure, ProxyError};
use crate::router::dispatch::DispatchEngine;
use crate::router::journal::StateJournal;

/// Execution context injected into a facet.
pub struct ProxyContext<'c, 's> {
    journal: &'c mut StateJournal<'s>,
    engine: &'c DispatchEngine,
    caller: Address,
    value: U256,
    selector: Selector,
    calldata: &'c [u8],
}

impl<'c, 's> ProxyContext<'c, 's> {
    pub(crate) fn new(
        journal: &'c mut StateJournal<'s>,
        engine: &'c DispatchEngine,
        caller: Address,
        value: U256,
        selector: Selector,
        calldata: &'c [u8],
    ) -> Self {
        Self {
            journal,
            engine,
            caller,
            value,
            selector,
            calldata,
        }
    }

    /// The proxy this facet is running inside.
    #[must_use]
    pub fn proxy_address(&self) -> Address {
        self.engine.proxy_address()
    }

    /// Original caller of the proxy.
    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Value sent with the call (already credited to the proxy).
    #[must_use]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Selector that routed here.
    #[must_use]
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Full calldata, selector included.
    #[must_use]
    pub fn calldata(&self) -> &[u8] {
        self.calldata
    }

    /// Calldata after the selector.
    #[must_use]
    pub fn args(&self) -> &[u8] {
        self.calldata.get(Selector::LEN..).unwrap_or_default()
    }

    /// Read a proxy storage slot.
    #[must_use]
    pub fn sload(&self, key: &StorageKey) -> StorageValue {
        self.journal.load(key)
    }

    /// Write a proxy storage slot.
    pub fn sstore(&mut self, key: StorageKey, value: StorageValue) {
        self.journal.store(key, value);
    }

    /// Proxy balance, including value staged in this call.
    #[must_use]
    pub fn balance(&self) -> U256 {
        self.journal.balance()
    }

    /// Pay `amount` out of the proxy balance.
    pub fn transfer(&mut self, to: Address, amount: U256) -> Result<(), FacetFailure> {
        self.journal.debit(to, amount).map_err(FacetFailure::from)
    }

    /// Emit a log from the proxy.
    pub fn emit(&mut self, topics: Vec<Hash>, data: Bytes) {
        let log = Log::new(self.proxy_address(), topics, data);
        self.journal.emit(log);
    }

    /// Current admin as seen by this call.
    #[must_use]
    pub fn admin(&self) -> Address {
        self.engine.admin_registry().get(&*self.journal)
    }

    /// Current target of `selector` as seen by this call.
    #[must_use]
    pub fn target_of(&self, selector: Selector) -> Address {
        self.engine.selector_table().get(&*self.journal, selector)
    }

    /// Call an admin entrypoint of the proxy from inside the proxy.
    ///
    /// The caller identity is the proxy's own address, so this only succeeds
    /// when the proxy is its own admin or the self-admin policy is enabled.
    pub fn admin_call(&mut self, call: &AdminCall) -> Result<(), ProxyError> {
        let proxy = self.proxy_address();
        self.engine.apply_admin_call(&mut *self.journal, proxy, call)
    }
}

impl std::fmt::Debug for ProxyContext<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyContext")
            .field("proxy", &self.proxy_address())
            .field("caller", &self.caller)
            .field("value", &self.value)
            .field("selector", &self.selector)
            .field("calldata_len", &self.calldata.len())
            .finish()
    }
}
