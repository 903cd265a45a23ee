//! # Proxy Storage
//!
//! The single persistent-state store owned by the proxy. The admin, both
//! routing tables and any facet-defined state all live in the same slot
//! space.

use crate::domain::entities::{AuditRecord, Log, StateChange};
use crate::domain::value_objects::{StorageKey, StorageValue, U256};
use std::collections::HashMap;

/// Slot-level access to proxy state.
///
/// Implemented by the committed [`ProxyStorage`] and by the journal that
/// stages an invocation's writes, so the admin registry and the tables work
/// the same way on both.
pub trait StateStore {
    /// Read a slot. Unset slots read as zero.
    fn load(&self, key: &StorageKey) -> StorageValue;

    /// Write a slot.
    fn store(&mut self, key: StorageKey, value: StorageValue);

    /// Append to the audit trail.
    fn record_audit(&mut self, record: AuditRecord);
}

/// Changes staged by one invocation, ready to apply as a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// Storage writes and value movements, in execution order.
    pub changes: Vec<StateChange>,
    /// Audit records to append.
    pub audit: Vec<AuditRecord>,
    /// Logs emitted by the facet.
    pub logs: Vec<Log>,
}

/// Committed proxy state.
#[derive(Clone, Debug, Default)]
pub struct ProxyStorage {
    /// Non-zero slots.
    slots: HashMap<StorageKey, StorageValue>,
    /// Value held by the proxy.
    balance: U256,
    /// Append-only audit trail.
    audit: Vec<AuditRecord>,
}

impl ProxyStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value currently held by the proxy.
    #[must_use]
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Every audit record since construction, oldest first.
    #[must_use]
    pub fn audit_trail(&self) -> &[AuditRecord] {
        &self.audit
    }

    /// Number of non-zero slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Apply a staged commit.
    ///
    /// The journal that produced `commit` already checked every balance
    /// movement against this store, so the arithmetic here cannot wrap.
    pub fn apply(&mut self, commit: &Commit) {
        for change in &commit.changes {
            match change {
                StateChange::StorageWrite { key, value } => self.store(*key, *value),
                StateChange::ValueReceived { amount, .. } => {
                    self.balance = self.balance.saturating_add(*amount);
                }
                StateChange::ValueSent { amount, .. } => {
                    self.balance = self.balance.saturating_sub(*amount);
                }
            }
        }
        self.audit.extend(commit.audit.iter().cloned());
    }
}

impl StateStore for ProxyStorage {
    fn load(&self, key: &StorageKey) -> StorageValue {
        self.slots.get(key).copied().unwrap_or(StorageValue::ZERO)
    }

    fn store(&mut self, key: StorageKey, value: StorageValue) {
        if value.is_zero() {
            self.slots.remove(&key);
        } else {
            self.slots.insert(key, value);
        }
    }

    fn record_audit(&mut self, record: AuditRecord) {
        self.audit.push(record);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, Selector};

    #[test]
    fn test_unset_slot_reads_zero() {
        let storage = ProxyStorage::new();
        assert!(storage.load(&StorageKey::new([9u8; 32])).is_zero());
    }

    #[test]
    fn test_zero_write_clears_slot() {
        let mut storage = ProxyStorage::new();
        let key = StorageKey::new([1u8; 32]);

        storage.store(key, StorageValue::from_u256(U256::from(7)));
        assert_eq!(storage.slot_count(), 1);

        storage.store(key, StorageValue::ZERO);
        assert_eq!(storage.slot_count(), 0);
        assert!(storage.load(&key).is_zero());
    }

    #[test]
    fn test_apply_commit() {
        let mut storage = ProxyStorage::new();
        let key = StorageKey::new([2u8; 32]);
        let record = AuditRecord::RouteChanged {
            selector: Selector::from_u32(1),
            old_target: Address::ZERO,
            new_target: Address::new([5u8; 20]),
        };

        storage.apply(&Commit {
            changes: vec![
                StateChange::ValueReceived {
                    from: Address::new([1u8; 20]),
                    amount: U256::from(100),
                },
                StateChange::StorageWrite {
                    key,
                    value: StorageValue::from_u256(U256::from(3)),
                },
                StateChange::ValueSent {
                    to: Address::new([2u8; 20]),
                    amount: U256::from(40),
                },
            ],
            audit: vec![record.clone()],
            logs: Vec::new(),
        });

        assert_eq!(storage.balance(), U256::from(60));
        assert_eq!(storage.load(&key).to_u256(), U256::from(3));
        assert_eq!(storage.audit_trail(), &[record]);
    }
}
