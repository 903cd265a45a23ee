//! # Selector Proxy
//!
//! The proxy aggregate: committed storage plus the engine that routes for
//! it. Every mutating operation stages its changes on a journal and applies
//! them in one step, so an error leaves the proxy untouched.

use crate::domain::config::ProxyConfig;
use crate::domain::entities::{AdminCall, AuditRecord, DispatchOutcome, Invocation};
use crate::domain::invariants::{
    check_all_invariants, check_deposit_invariant, check_outcome_invariant,
    check_route_invariant, InvariantCheckResult, InvariantViolation,
};
use crate::domain::storage::{Commit, ProxyStorage, StateStore};
use crate::domain::value_objects::{Address, Selector, StorageKey, StorageValue, U256};
use crate::errors::ProxyError;
use crate::ports::outbound::FacetResolver;
use crate::router::dispatch::DispatchEngine;
use tracing::{error, info};

/// A deployed selector proxy.
#[derive(Clone, Debug)]
pub struct SelectorProxy {
    storage: ProxyStorage,
    engine: DispatchEngine,
    config: ProxyConfig,
}

impl SelectorProxy {
    /// Construct a proxy at `address` with `deployer` as its first admin.
    pub fn deploy(
        address: Address,
        deployer: Address,
        config: ProxyConfig,
    ) -> Result<Self, ProxyError> {
        config
            .validate()
            .map_err(|e| ProxyError::InvalidArgument(e.to_string()))?;
        if address.is_zero() {
            return Err(ProxyError::InvalidArgument(
                "proxy address is the zero address".to_string(),
            ));
        }

        let engine = DispatchEngine::new(address, &config);
        let mut storage = ProxyStorage::new();
        engine.admin_registry().initialize(&mut storage, deployer)?;

        info!(
            proxy = ?address,
            admin = ?deployer,
            policy = ?config.admin_policy(),
            "Selector proxy deployed"
        );

        Ok(Self {
            storage,
            engine,
            config,
        })
    }

    /// Address of this proxy.
    #[must_use]
    pub fn address(&self) -> Address {
        self.engine.proxy_address()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Current admin.
    #[must_use]
    pub fn get_admin(&self) -> Address {
        self.engine.admin_registry().get(&self.storage)
    }

    /// Target bound to `selector`, ZERO when unrouted.
    #[must_use]
    pub fn get_target(&self, selector: Selector) -> Address {
        self.engine.selector_table().get(&self.storage, selector)
    }

    /// Caller restriction on `selector`, ZERO when open.
    #[must_use]
    pub fn get_restriction(&self, selector: Selector) -> Address {
        self.engine.restriction_table().get(&self.storage, selector)
    }

    /// Value held by the proxy.
    #[must_use]
    pub fn balance(&self) -> U256 {
        self.storage.balance()
    }

    /// Every audit record since deployment, oldest first.
    #[must_use]
    pub fn audit_trail(&self) -> &[AuditRecord] {
        self.storage.audit_trail()
    }

    /// Raw slot read.
    #[must_use]
    pub fn sload(&self, key: &StorageKey) -> StorageValue {
        self.storage.load(key)
    }

    /// Bind `selector` to `target`. Returns the previous target.
    pub fn sharp_cut(
        &mut self,
        caller: Address,
        selector: Selector,
        target: Address,
    ) -> Result<Address, ProxyError> {
        let old_target = self.get_target(selector);
        self.execute_admin(caller, &AdminCall::SharpCut { selector, target })?;

        if !check_route_invariant(self.engine.selector_table(), &self.storage, selector, target) {
            let violation = InvariantViolation::RouteMismatch {
                selector,
                expected: target,
                actual: self.get_target(selector),
            };
            error!(%violation, "Invariant violated after cut");
        }
        Ok(old_target)
    }

    /// Restrict `selector` to `allowed`. Returns the previous restriction.
    pub fn restrict(
        &mut self,
        caller: Address,
        selector: Selector,
        allowed: Address,
    ) -> Result<Address, ProxyError> {
        let previous = self.get_restriction(selector);
        self.execute_admin(caller, &AdminCall::Restrict { selector, allowed })?;
        Ok(previous)
    }

    /// Replace the admin. Returns the previous admin.
    pub fn change_admin(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<Address, ProxyError> {
        let old_admin = self.get_admin();
        self.execute_admin(caller, &AdminCall::ChangeAdmin { new_admin })?;
        Ok(old_admin)
    }

    /// Run an admin call and commit it. Returns the audit records it added.
    pub fn execute_admin(
        &mut self,
        caller: Address,
        call: &AdminCall,
    ) -> Result<Vec<AuditRecord>, ProxyError> {
        let commit = self.engine.admin_call(&self.storage, caller, call)?;
        Ok(self.commit(commit).audit)
    }

    /// Accept a bare deposit.
    pub fn deposit(&mut self, caller: Address, value: U256) -> Result<DispatchOutcome, ProxyError> {
        let before = self.balance();
        let commit = self.engine.deposit(&self.storage, caller, value)?;
        let commit = self.commit(commit);

        if !check_deposit_invariant(before, self.balance(), value) {
            let violation = InvariantViolation::DepositMismatch {
                before,
                after: self.balance(),
                value,
            };
            error!(%violation, "Invariant violated after deposit");
        }

        Ok(DispatchOutcome {
            state_changes: commit.changes,
            ..DispatchOutcome::default()
        })
    }

    /// The default entrypoint.
    pub fn invoke(
        &mut self,
        facets: &dyn FacetResolver,
        invocation: &Invocation,
    ) -> Result<DispatchOutcome, ProxyError> {
        if invocation.is_bare_deposit() {
            return self.deposit(invocation.caller, invocation.value);
        }

        let dispatched = self.engine.dispatch(&self.storage, facets, invocation)?;
        let commit = self.commit(dispatched.commit);

        let outcome = DispatchOutcome {
            selector: dispatched.selector,
            target: dispatched.target,
            output: dispatched.output,
            logs: commit.logs,
            state_changes: commit.changes,
            audit: commit.audit,
        };
        if !check_outcome_invariant(&outcome) {
            error!(
                selector = ?outcome.selector,
                target = ?outcome.target,
                "Invariant violated: committed outcome has no live target"
            );
        }
        Ok(outcome)
    }

    fn commit(&mut self, commit: Commit) -> Commit {
        self.storage.apply(&commit);
        if let InvariantCheckResult::Violations(violations) =
            check_all_invariants(self.engine.admin_registry(), &self.storage)
        {
            for violation in violations {
                error!(%violation, "Invariant violated after commit");
            }
        }
        commit
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::StateChange;
    use crate::domain::value_objects::Bytes;
    use crate::errors::FacetFailure;
    use crate::ports::outbound::Facet;
    use crate::router::ProxyContext;
    use std::collections::HashMap;
    use std::sync::Arc;

    const PROXY: Address = Address([0xEE; 20]);
    const ADMIN: Address = Address([0xAD; 20]);
    const USER: Address = Address([0x05; 20]);
    const T1: Address = Address([0x01; 20]);
    const T2: Address = Address([0x02; 20]);
    const SEL: Selector = Selector::from_u32(0xAAAA_AAAA);

    struct Tagged(u8);

    impl Facet for Tagged {
        fn invoke(&self, _ctx: &mut ProxyContext<'_, '_>) -> Result<Bytes, FacetFailure> {
            Ok(Bytes::from_slice(&[self.0]))
        }
    }

    struct Resolver(HashMap<Address, Arc<dyn Facet>>);

    impl FacetResolver for Resolver {
        fn resolve(&self, address: &Address) -> Option<Arc<dyn Facet>> {
            self.0.get(address).cloned()
        }
    }

    fn facets() -> Resolver {
        let mut map: HashMap<Address, Arc<dyn Facet>> = HashMap::new();
        map.insert(T1, Arc::new(Tagged(1)));
        map.insert(T2, Arc::new(Tagged(2)));
        Resolver(map)
    }

    fn deploy() -> SelectorProxy {
        SelectorProxy::deploy(PROXY, ADMIN, ProxyConfig::default()).unwrap()
    }

    #[test]
    fn test_deploy_seeds_admin() {
        let proxy = deploy();
        assert_eq!(proxy.get_admin(), ADMIN);
        assert_eq!(proxy.address(), PROXY);
        assert!(proxy.audit_trail().is_empty());
    }

    #[test]
    fn test_deploy_rejects_zero_identities() {
        assert!(matches!(
            SelectorProxy::deploy(PROXY, Address::ZERO, ProxyConfig::default()),
            Err(ProxyError::InvalidArgument(_))
        ));
        assert!(matches!(
            SelectorProxy::deploy(Address::ZERO, ADMIN, ProxyConfig::default()),
            Err(ProxyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_deploy_rejects_invalid_config() {
        let config = ProxyConfig::default().with_max_calldata_size(1);
        assert!(matches!(
            SelectorProxy::deploy(PROXY, ADMIN, config),
            Err(ProxyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_upgrade_scenario() {
        let mut proxy = deploy();
        let facets = facets();
        let call = Invocation::call(USER, SEL, &[]);

        assert_eq!(proxy.sharp_cut(ADMIN, SEL, T1), Ok(Address::ZERO));
        assert_eq!(proxy.invoke(&facets, &call).unwrap().output.as_slice(), &[1]);

        assert_eq!(proxy.sharp_cut(ADMIN, SEL, T2), Ok(T1));
        assert_eq!(proxy.invoke(&facets, &call).unwrap().output.as_slice(), &[2]);

        assert_eq!(proxy.sharp_cut(ADMIN, SEL, Address::ZERO), Ok(T2));
        assert_eq!(
            proxy.invoke(&facets, &call),
            Err(ProxyError::RouteNotFound(SEL))
        );

        assert_eq!(proxy.audit_trail().len(), 3);
    }

    #[test]
    fn test_noop_cut_still_audited() {
        let mut proxy = deploy();
        proxy.sharp_cut(ADMIN, SEL, T1).unwrap();
        proxy.sharp_cut(ADMIN, SEL, T1).unwrap();

        assert_eq!(
            proxy.audit_trail()[1],
            AuditRecord::RouteChanged {
                selector: SEL,
                old_target: T1,
                new_target: T1
            }
        );
    }

    #[test]
    fn test_unauthorized_admin_calls_change_nothing() {
        let mut proxy = deploy();

        assert_eq!(
            proxy.sharp_cut(USER, SEL, T1),
            Err(ProxyError::Unauthorized { caller: USER })
        );
        assert_eq!(
            proxy.restrict(USER, SEL, USER),
            Err(ProxyError::Unauthorized { caller: USER })
        );
        assert_eq!(
            proxy.change_admin(USER, USER),
            Err(ProxyError::Unauthorized { caller: USER })
        );

        assert_eq!(proxy.get_target(SEL), Address::ZERO);
        assert_eq!(proxy.get_restriction(SEL), Address::ZERO);
        assert_eq!(proxy.get_admin(), ADMIN);
        assert!(proxy.audit_trail().is_empty());
    }

    #[test]
    fn test_change_admin() {
        let mut proxy = deploy();

        assert!(matches!(
            proxy.change_admin(ADMIN, Address::ZERO),
            Err(ProxyError::InvalidArgument(_))
        ));
        assert_eq!(proxy.change_admin(ADMIN, USER), Ok(ADMIN));
        assert_eq!(proxy.get_admin(), USER);

        assert!(proxy.sharp_cut(ADMIN, SEL, T1).is_err());
        assert!(proxy.sharp_cut(USER, SEL, T1).is_ok());
    }

    #[test]
    fn test_restrict_round_trip() {
        let mut proxy = deploy();
        let facets = facets();
        proxy.sharp_cut(ADMIN, SEL, T1).unwrap();

        assert_eq!(proxy.restrict(ADMIN, SEL, ADMIN), Ok(Address::ZERO));
        assert!(proxy
            .invoke(&facets, &Invocation::call(USER, SEL, &[]))
            .unwrap_err()
            .is_unauthorized());

        assert_eq!(proxy.restrict(ADMIN, SEL, Address::ZERO), Ok(ADMIN));
        assert!(proxy.invoke(&facets, &Invocation::call(USER, SEL, &[])).is_ok());
    }

    #[test]
    fn test_deposit_credits_balance() {
        let mut proxy = deploy();
        let outcome = proxy
            .invoke(&facets(), &Invocation::deposit(USER, U256::from(50)))
            .unwrap();

        assert!(outcome.is_deposit());
        assert_eq!(proxy.balance(), U256::from(50));
        assert_eq!(
            outcome.state_changes,
            vec![StateChange::ValueReceived {
                from: USER,
                amount: U256::from(50)
            }]
        );
    }

    #[test]
    fn test_committed_outcomes_satisfy_invariants() {
        let mut proxy = deploy();
        let facets = facets();
        proxy.sharp_cut(ADMIN, SEL, T1).unwrap();

        let routed = proxy
            .invoke(&facets, &Invocation::call(USER, SEL, &[]))
            .unwrap();
        assert!(check_outcome_invariant(&routed));
        assert_eq!(routed.target, Some(T1));

        let deposit = proxy
            .invoke(&facets, &Invocation::deposit(USER, U256::from(3)))
            .unwrap();
        assert!(check_outcome_invariant(&deposit));

        assert!(check_all_invariants(proxy.engine.admin_registry(), &proxy.storage).is_ok());
    }

    #[test]
    fn test_failed_invoke_keeps_value_out() {
        let mut proxy = deploy();
        let call = Invocation::call(USER, SEL, &[]).with_value(U256::from(10));
        assert!(proxy.invoke(&facets(), &call).is_err());
        assert!(proxy.balance().is_zero());
    }
}
