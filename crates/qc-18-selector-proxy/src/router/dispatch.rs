//! # Dispatch Engine
//!
//! Resolves an invocation to a facet, enforces authorization and runs the
//! facet against the proxy's own state.
//!
//! ## Algorithm
//!
//! 1. Empty calldata is a bare deposit: both tables are bypassed.
//! 2. Read the selector from the first four calldata bytes.
//! 3. Selector table lookup. Zero target → `RouteNotFound`.
//! 4. Restriction lookup. Set and caller differs → `RestrictedSelector`.
//! 5. Resolve the facet deployed at the target.
//! 6. Credit the value, run the facet on a journal over proxy storage.
//! 7. Relay the facet's output or failure unmodified.
//!
//! Nothing is written to the proxy here. The engine hands back a
//! [`Commit`] that the owner applies, so a failure at any step leaves
//! committed state exactly as it was.

use crate::domain::admin::AdminRegistry;
use crate::domain::config::ProxyConfig;
use crate::domain::entities::{AdminCall, Invocation};
use crate::domain::storage::{Commit, ProxyStorage, StateStore};
use crate::domain::tables::{RestrictionTable, SelectorTable};
use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::ProxyError;
use crate::ports::outbound::FacetResolver;
use crate::router::context::ProxyContext;
use crate::router::journal::StateJournal;
use tracing::{debug, info, warn};

/// A dispatch that succeeded and is ready to commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    /// Selector that was dispatched (`None` for a deposit).
    pub selector: Option<Selector>,
    /// Resolved target (`None` for a deposit).
    pub target: Option<Address>,
    /// Facet output, unmodified.
    pub output: Bytes,
    /// Staged changes.
    pub commit: Commit,
}

/// The routing core of the proxy.
#[derive(Clone, Debug)]
pub struct DispatchEngine {
    proxy: Address,
    admin: AdminRegistry,
    selectors: SelectorTable,
    restrictions: RestrictionTable,
    max_calldata_size: usize,
}

impl DispatchEngine {
    /// Engine for the proxy at `proxy`.
    #[must_use]
    pub fn new(proxy: Address, config: &ProxyConfig) -> Self {
        Self {
            proxy,
            admin: AdminRegistry::new(config.admin_policy()),
            selectors: SelectorTable::new(),
            restrictions: RestrictionTable::new(),
            max_calldata_size: config.max_calldata_size,
        }
    }

    /// Address of the proxy this engine routes for.
    #[must_use]
    pub fn proxy_address(&self) -> Address {
        self.proxy
    }

    /// The admin registry.
    #[must_use]
    pub fn admin_registry(&self) -> &AdminRegistry {
        &self.admin
    }

    /// The selector table.
    #[must_use]
    pub fn selector_table(&self) -> &SelectorTable {
        &self.selectors
    }

    /// The restriction table.
    #[must_use]
    pub fn restriction_table(&self) -> &RestrictionTable {
        &self.restrictions
    }

    /// Apply one admin call to `store` on behalf of `caller`.
    ///
    /// Generic over the store so the same path serves direct admin calls and
    /// self-calls made by a facet mid-dispatch.
    pub fn apply_admin_call<S: StateStore>(
        &self,
        store: &mut S,
        caller: Address,
        call: &AdminCall,
    ) -> Result<(), ProxyError> {
        match *call {
            AdminCall::SharpCut { selector, target } => {
                self.admin.authorize(&*store, caller, self.proxy)?;
                let old_target = self.selectors.set(store, selector, target);
                info!(%selector, ?old_target, new_target = ?target, "Route cut");
            }
            AdminCall::Restrict { selector, allowed } => {
                self.admin.authorize(&*store, caller, self.proxy)?;
                let previous = self.restrictions.set(store, selector, allowed);
                info!(%selector, ?previous, ?allowed, "Selector restriction updated");
            }
            AdminCall::ChangeAdmin { new_admin } => {
                let old_admin = self.admin.change(store, caller, self.proxy, new_admin)?;
                info!(?old_admin, ?new_admin, "Admin changed");
            }
        }
        Ok(())
    }

    /// Stage an admin call against committed storage.
    pub fn admin_call(
        &self,
        storage: &ProxyStorage,
        caller: Address,
        call: &AdminCall,
    ) -> Result<Commit, ProxyError> {
        let mut journal = StateJournal::new(storage);
        if let Err(err) = self.apply_admin_call(&mut journal, caller, call) {
            debug!(?caller, operation = call.name(), error = %err, "Admin call rejected");
            return Err(err);
        }
        Ok(journal.into_commit())
    }

    /// Stage a bare deposit. Never consults the tables.
    pub fn deposit(
        &self,
        storage: &ProxyStorage,
        caller: Address,
        value: U256,
    ) -> Result<Commit, ProxyError> {
        let mut journal = StateJournal::new(storage);
        journal.credit(caller, value)?;
        debug!(?caller, %value, "Deposit accepted");
        Ok(journal.into_commit())
    }

    /// Resolve, authorize and run an invocation.
    pub fn dispatch(
        &self,
        storage: &ProxyStorage,
        facets: &dyn FacetResolver,
        invocation: &Invocation,
    ) -> Result<Dispatched, ProxyError> {
        if invocation.is_bare_deposit() {
            let commit = self.deposit(storage, invocation.caller, invocation.value)?;
            return Ok(Dispatched {
                selector: None,
                target: None,
                output: Bytes::new(),
                commit,
            });
        }

        if invocation.data.len() > self.max_calldata_size {
            return Err(ProxyError::InvalidArgument(format!(
                "calldata of {} bytes exceeds limit of {}",
                invocation.data.len(),
                self.max_calldata_size
            )));
        }

        let selector = invocation.selector().ok_or_else(|| {
            ProxyError::InvalidArgument(format!(
                "calldata of {} bytes is too short for a selector",
                invocation.data.len()
            ))
        })?;

        let target = self.selectors.get(storage, selector);
        if target.is_zero() {
            debug!(%selector, "No route");
            return Err(ProxyError::RouteNotFound(selector));
        }

        if !self
            .restrictions
            .permits(storage, selector, invocation.caller)
        {
            let allowed = self.restrictions.get(storage, selector);
            warn!(%selector, caller = ?invocation.caller, ?allowed, "Restricted selector");
            return Err(ProxyError::RestrictedSelector {
                selector,
                caller: invocation.caller,
                allowed,
            });
        }

        let facet = facets
            .resolve(&target)
            .ok_or(ProxyError::TargetNotDeployed { selector, target })?;

        debug!(%selector, ?target, facet = facet.name(), "Dispatching");

        let mut journal = StateJournal::new(storage);
        journal.credit(invocation.caller, invocation.value)?;

        let output = {
            let mut ctx = ProxyContext::new(
                &mut journal,
                self,
                invocation.caller,
                invocation.value,
                selector,
                invocation.data.as_slice(),
            );
            facet.invoke(&mut ctx).map_err(|failure| {
                debug!(%selector, reason = %failure.reason, "Facet failed");
                ProxyError::TargetFailure(failure)
            })?
        };

        if self.admin.get(&journal).is_zero() {
            warn!(%selector, ?target, "Facet cleared the admin slot");
            return Err(ProxyError::InvalidArgument(
                "dispatch would leave the admin slot empty".to_string(),
            ));
        }

        Ok(Dispatched {
            selector: Some(selector),
            target: Some(target),
            output,
            commit: journal.into_commit(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
