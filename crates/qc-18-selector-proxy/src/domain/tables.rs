//! # Routing Tables
//!
//! Selector → target and selector → allowed-caller mappings, stored in the
//! proxy's slot space. Both are plain storage; authorization happens in the
//! dispatch engine before either is mutated.

use crate::domain::entities::AuditRecord;
use crate::domain::services::{
    mapping_slot, namespaced_slot, RESTRICTION_TABLE_NAMESPACE, SELECTOR_TABLE_NAMESPACE,
};
use crate::domain::storage::StateStore;
use crate::domain::value_objects::{Address, Selector, StorageKey, StorageValue};

// =============================================================================
// SELECTOR TABLE
// =============================================================================

/// Routing data: which target implements each selector.
#[derive(Clone, Debug)]
pub struct SelectorTable {
    base: StorageKey,
}

impl SelectorTable {
    /// Table rooted at the standard namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: namespaced_slot(SELECTOR_TABLE_NAMESPACE),
        }
    }

    /// Slot holding the target of `selector`.
    #[must_use]
    pub fn slot(&self, selector: Selector) -> StorageKey {
        mapping_slot(selector, self.base)
    }

    /// Target of `selector`, `Address::ZERO` when unrouted.
    #[must_use]
    pub fn get<S: StateStore>(&self, store: &S, selector: Selector) -> Address {
        store.load(&self.slot(selector)).to_address()
    }

    /// Binds `selector` to `target` (ZERO unbinds) and records the cut.
    ///
    /// The record is written even when the target does not change.
    pub fn set<S: StateStore>(&self, store: &mut S, selector: Selector, target: Address) -> Address {
        let old_target = self.get(&*store, selector);
        store.store(self.slot(selector), StorageValue::from_address(target));
        store.record_audit(AuditRecord::RouteChanged {
            selector,
            old_target,
            new_target: target,
        });
        old_target
    }
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RESTRICTION TABLE
// =============================================================================

/// Optional single-caller restriction per selector.
#[derive(Clone, Debug)]
pub struct RestrictionTable {
    base: StorageKey,
}

impl RestrictionTable {
    /// Table rooted at the standard namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: namespaced_slot(RESTRICTION_TABLE_NAMESPACE),
        }
    }

    /// Slot holding the restriction of `selector`.
    #[must_use]
    pub fn slot(&self, selector: Selector) -> StorageKey {
        mapping_slot(selector, self.base)
    }

    /// Allowed caller for `selector`, `Address::ZERO` when unrestricted.
    #[must_use]
    pub fn get<S: StateStore>(&self, store: &S, selector: Selector) -> Address {
        store.load(&self.slot(selector)).to_address()
    }

    /// Restricts `selector` to `allowed`; ZERO lifts the restriction.
    pub fn set<S: StateStore>(&self, store: &mut S, selector: Selector, allowed: Address) -> Address {
        let previous = self.get(&*store, selector);
        store.store(self.slot(selector), StorageValue::from_address(allowed));
        previous
    }

    /// True when `caller` may dispatch `selector`.
    #[must_use]
    pub fn permits<S: StateStore>(&self, store: &S, selector: Selector, caller: Address) -> bool {
        let allowed = self.get(store, selector);
        allowed.is_zero() || allowed == caller
    }
}

impl Default for RestrictionTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::ProxyStorage;

    const T1: Address = Address([0x11; 20]);
    const T2: Address = Address([0x22; 20]);

    #[test]
    fn test_unset_selector_is_unrouted() {
        let table = SelectorTable::new();
        let storage = ProxyStorage::new();
        assert_eq!(table.get(&storage, Selector::from_u32(7)), Address::ZERO);
    }

    #[test]
    fn test_set_and_replace_route() {
        let table = SelectorTable::new();
        let mut storage = ProxyStorage::new();
        let sel = Selector::from_u32(0xAAAA_AAAA);

        assert_eq!(table.set(&mut storage, sel, T1), Address::ZERO);
        assert_eq!(table.get(&storage, sel), T1);

        assert_eq!(table.set(&mut storage, sel, T2), T1);
        assert_eq!(table.get(&storage, sel), T2);

        assert_eq!(table.set(&mut storage, sel, Address::ZERO), T2);
        assert_eq!(table.get(&storage, sel), Address::ZERO);
        assert_eq!(storage.slot_count(), 0);
    }

    #[test]
    fn test_noop_cut_still_audited() {
        let table = SelectorTable::new();
        let mut storage = ProxyStorage::new();
        let sel = Selector::from_u32(1);

        table.set(&mut storage, sel, T1);
        table.set(&mut storage, sel, T1);

        assert_eq!(storage.audit_trail().len(), 2);
        assert_eq!(
            storage.audit_trail()[1],
            AuditRecord::RouteChanged {
                selector: sel,
                old_target: T1,
                new_target: T1
            }
        );
    }

    #[test]
    fn test_restriction_permits() {
        let table = RestrictionTable::new();
        let mut storage = ProxyStorage::new();
        let sel = Selector::from_u32(3);

        assert!(table.permits(&storage, sel, T1));
        assert!(table.permits(&storage, sel, T2));

        table.set(&mut storage, sel, T1);
        assert!(table.permits(&storage, sel, T1));
        assert!(!table.permits(&storage, sel, T2));

        table.set(&mut storage, sel, Address::ZERO);
        assert!(table.permits(&storage, sel, T2));
    }

    #[test]
    fn test_tables_do_not_share_slots() {
        let selectors = SelectorTable::new();
        let restrictions = RestrictionTable::new();
        let mut storage = ProxyStorage::new();
        let sel = Selector::from_u32(0x1234_5678);

        selectors.set(&mut storage, sel, T1);
        assert_eq!(restrictions.get(&storage, sel), Address::ZERO);

        restrictions.set(&mut storage, sel, T2);
        assert_eq!(selectors.get(&storage, sel), T1);
        // Restrictions are not part of the audit trail.
        assert_eq!(storage.audit_trail().len(), 1);
    }
}
