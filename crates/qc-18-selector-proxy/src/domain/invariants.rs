//! # Domain Invariants
//!
//! Invariants that MUST hold for proxy state after every committed
//! invocation.
//!
//! - INVARIANT-1: Admin Never Null
//! - INVARIANT-2: Route Read-Back (a cut is observable through `get_target`)
//! - INVARIANT-3: Deposit Exactness (balance grows by exactly the deposit)
//! - INVARIANT-4: Failure Leaves No Trace (no changes reported on failure)

use crate::domain::admin::AdminRegistry;
use crate::domain::entities::DispatchOutcome;
use crate::domain::storage::StateStore;
use crate::domain::tables::SelectorTable;
use crate::domain::value_objects::{Address, Selector, U256};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: Admin Never Null
///
/// Once construction completes the admin slot never holds the zero address.
#[must_use]
pub fn check_admin_invariant<S: StateStore>(registry: &AdminRegistry, store: &S) -> bool {
    !registry.get(store).is_zero()
}

/// INVARIANT-2: Route Read-Back
#[must_use]
pub fn check_route_invariant<S: StateStore>(
    table: &SelectorTable,
    store: &S,
    selector: Selector,
    expected: Address,
) -> bool {
    table.get(store, selector) == expected
}

/// INVARIANT-3: Deposit Exactness
#[must_use]
pub fn check_deposit_invariant(before: U256, after: U256, value: U256) -> bool {
    before.checked_add(value) == Some(after)
}

/// INVARIANT-4: Failure Leaves No Trace
///
/// An outcome is only produced for committed invocations, and a bare
/// deposit never carries facet output or logs.
#[must_use]
pub fn check_outcome_invariant(outcome: &DispatchOutcome) -> bool {
    if outcome.is_deposit() {
        outcome.target.is_none() && outcome.output.is_empty() && outcome.logs.is_empty()
    } else {
        outcome.target.is_some_and(|target| !target.is_zero())
    }
}

/// Check the state invariants that hold at rest.
#[must_use]
pub fn check_all_invariants<S: StateStore>(
    registry: &AdminRegistry,
    store: &S,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_admin_invariant(registry, store) {
        violations.push(InvariantViolation::NullAdmin);
    }

    if violations.is_empty() {
        InvariantCheckResult::Ok
    } else {
        InvariantCheckResult::Violations(violations)
    }
}

// =============================================================================
// INVARIANT RESULT TYPES
// =============================================================================

/// Result of checking invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants satisfied.
    Ok,
    /// One or more invariants violated.
    Violations(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants are satisfied.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The admin slot holds the zero address.
    NullAdmin,
    /// A route does not read back as written.
    RouteMismatch {
        /// Selector that was cut.
        selector: Selector,
        /// Target that was written.
        expected: Address,
        /// Target that was read.
        actual: Address,
    },
    /// The balance did not grow by exactly the deposited value.
    DepositMismatch {
        /// Balance before the deposit.
        before: U256,
        /// Balance after the deposit.
        after: U256,
        /// Deposited value.
        value: U256,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullAdmin => write!(f, "INVARIANT-1 violated: admin is the zero address"),
            Self::RouteMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "INVARIANT-2 violated: {selector} expected {expected:?}, read {actual:?}"
            ),
            Self::DepositMismatch {
                before,
                after,
                value,
            } => write!(
                f,
                "INVARIANT-3 violated: {before} + {value} != {after}"
            ),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::admin::AdminPolicy;
    use crate::domain::storage::ProxyStorage;

    #[test]
    fn test_admin_invariant() {
        let registry = AdminRegistry::new(AdminPolicy::AdminOnly);
        let mut storage = ProxyStorage::new();
        assert!(!check_admin_invariant(&registry, &storage));
        assert_eq!(
            check_all_invariants(&registry, &storage),
            InvariantCheckResult::Violations(vec![InvariantViolation::NullAdmin])
        );

        registry
            .initialize(&mut storage, Address::new([1u8; 20]))
            .unwrap();
        assert!(check_all_invariants(&registry, &storage).is_ok());
    }

    #[test]
    fn test_route_invariant() {
        let table = SelectorTable::new();
        let mut storage = ProxyStorage::new();
        let sel = Selector::from_u32(9);
        let target = Address::new([9u8; 20]);

        assert!(!check_route_invariant(&table, &storage, sel, target));
        table.set(&mut storage, sel, target);
        assert!(check_route_invariant(&table, &storage, sel, target));
    }

    #[test]
    fn test_deposit_invariant() {
        assert!(check_deposit_invariant(
            U256::from(10),
            U256::from(15),
            U256::from(5)
        ));
        assert!(!check_deposit_invariant(
            U256::from(10),
            U256::from(16),
            U256::from(5)
        ));
        assert!(!check_deposit_invariant(U256::MAX, U256::MAX, U256::one()));
    }

    #[test]
    fn test_outcome_invariant() {
        assert!(check_outcome_invariant(&DispatchOutcome::default()));

        let routed = DispatchOutcome {
            selector: Some(Selector::from_u32(1)),
            target: Some(Address::new([1u8; 20])),
            ..DispatchOutcome::default()
        };
        assert!(check_outcome_invariant(&routed));

        let broken = DispatchOutcome {
            selector: Some(Selector::from_u32(1)),
            target: None,
            ..DispatchOutcome::default()
        };
        assert!(!check_outcome_invariant(&broken));
    }

    #[test]
    fn test_violation_display() {
        let msg = InvariantViolation::NullAdmin.to_string();
        assert!(msg.contains("INVARIANT-1"));
    }
}
