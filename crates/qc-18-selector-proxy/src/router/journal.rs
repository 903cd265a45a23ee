//! # State Journal
//!
//! Write overlay over committed [`ProxyStorage`]. Every invocation runs
//! against a fresh journal; the journal is turned into a [`Commit`] on
//! success and simply dropped on failure.

use crate::domain::entities::{AuditRecord, Log, StateChange};
use crate::domain::storage::{Commit, ProxyStorage, StateStore};
use crate::domain::value_objects::{Address, StorageKey, StorageValue, U256};
use crate::errors::ProxyError;
use std::collections::HashMap;

/// Staged writes for one invocation.
#[derive(Debug)]
pub struct StateJournal<'s> {
    base: &'s ProxyStorage,
    pending: HashMap<StorageKey, StorageValue>,
    balance: U256,
    changes: Vec<StateChange>,
    audit: Vec<AuditRecord>,
    logs: Vec<Log>,
}

impl<'s> StateJournal<'s> {
    /// Open a journal over `base`.
    #[must_use]
    pub fn new(base: &'s ProxyStorage) -> Self {
        Self {
            base,
            pending: HashMap::new(),
            balance: base.balance(),
            changes: Vec::new(),
            audit: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Balance including staged movements.
    #[must_use]
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Stage an incoming value transfer.
    pub fn credit(&mut self, from: Address, amount: U256) -> Result<(), ProxyError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            ProxyError::InvalidArgument(format!("deposit of {amount} overflows the balance"))
        })?;
        self.changes.push(StateChange::ValueReceived { from, amount });
        Ok(())
    }

    /// Stage an outgoing value transfer.
    pub fn debit(&mut self, to: Address, amount: U256) -> Result<(), ProxyError> {
        if to.is_zero() {
            return Err(ProxyError::InvalidArgument(
                "transfer to the zero address".to_string(),
            ));
        }
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            ProxyError::InvalidArgument(format!(
                "insufficient balance: required {amount}, available {}",
                self.balance
            ))
        })?;
        self.changes.push(StateChange::ValueSent { to, amount });
        Ok(())
    }

    /// Stage a log.
    pub fn emit(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// True when nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.audit.is_empty() && self.logs.is_empty()
    }

    /// Finish the journal, releasing the borrow of the base storage.
    #[must_use]
    pub fn into_commit(self) -> Commit {
        Commit {
            changes: self.changes,
            audit: self.audit,
            logs: self.logs,
        }
    }
}

impl StateStore for StateJournal<'_> {
    fn load(&self, key: &StorageKey) -> StorageValue {
        match self.pending.get(key) {
            Some(value) => *value,
            None => self.base.load(key),
        }
    }

    fn store(&mut self, key: StorageKey, value: StorageValue) {
        self.pending.insert(key, value);
        self.changes.push(StateChange::StorageWrite { key, value });
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

    const KEY: StorageKey = StorageKey([4u8; 32]);
    const ALICE: Address = Address([0xA1; 20]);

    #[test]
    fn test_reads_fall_through_to_base() {
        let mut base = ProxyStorage::new();
        base.store(KEY, StorageValue::from_u256(U256::from(1)));

        let mut journal = StateJournal::new(&base);
        assert_eq!(journal.load(&KEY).to_u256(), U256::from(1));

        journal.store(KEY, StorageValue::from_u256(U256::from(2)));
        assert_eq!(journal.load(&KEY).to_u256(), U256::from(2));
        // Base untouched until commit.
        assert_eq!(base.load(&KEY).to_u256(), U256::from(1));
    }

    #[test]
    fn test_dropped_journal_leaves_base_untouched() {
        let base = ProxyStorage::new();
        {
            let mut journal = StateJournal::new(&base);
            journal.store(KEY, StorageValue::from_u256(U256::from(9)));
            journal.credit(ALICE, U256::from(100)).unwrap();
        }
        assert_eq!(base.slot_count(), 0);
        assert!(base.balance().is_zero());
    }

    #[test]
    fn test_commit_applies_writes_and_value() {
        let mut base = ProxyStorage::new();
        let commit = {
            let mut journal = StateJournal::new(&base);
            journal.credit(ALICE, U256::from(100)).unwrap();
            journal.debit(ALICE, U256::from(30)).unwrap();
            journal.store(KEY, StorageValue::from_u256(U256::from(5)));
            assert_eq!(journal.balance(), U256::from(70));
            journal.into_commit()
        };
        base.apply(&commit);

        assert_eq!(base.balance(), U256::from(70));
        assert_eq!(base.load(&KEY).to_u256(), U256::from(5));
    }

    #[test]
    fn test_zero_credit_is_not_recorded() {
        let base = ProxyStorage::new();
        let mut journal = StateJournal::new(&base);
        journal.credit(ALICE, U256::zero()).unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_debit_checks_balance() {
        let base = ProxyStorage::new();
        let mut journal = StateJournal::new(&base);
        let err = journal.debit(ALICE, U256::from(1)).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidArgument(_)));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut base = ProxyStorage::new();
        let commit = {
            let mut journal = StateJournal::new(&base);
            journal.credit(ALICE, U256::MAX).unwrap();
            journal.into_commit()
        };
        base.apply(&commit);

        let mut journal = StateJournal::new(&base);
        assert!(journal.credit(ALICE, U256::one()).is_err());
    }
}
