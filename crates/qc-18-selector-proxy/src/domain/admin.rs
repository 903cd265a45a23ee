//! # Admin Registry
//!
//! Holds the single privileged controller in the EIP-1967 admin slot and
//! gates every mutating entrypoint.

use crate::domain::entities::AuditRecord;
use crate::domain::services::ADMIN_SLOT;
use crate::domain::storage::StateStore;
use crate::domain::value_objects::{Address, StorageKey, StorageValue};
use crate::errors::ProxyError;
use serde::{Deserialize, Serialize};

/// Who counts as an admin-equivalent caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdminPolicy {
    /// Only the stored admin.
    #[default]
    AdminOnly,
    /// The stored admin, or the proxy's own address. Lets a routed facet
    /// reach the admin entrypoints through a self-call.
    AdminOrSelf,
}

/// Guarded accessor/mutator pair around the admin slot.
#[derive(Clone, Debug)]
pub struct AdminRegistry {
    slot: StorageKey,
    policy: AdminPolicy,
}

impl AdminRegistry {
    /// Registry on the standard admin slot.
    #[must_use]
    pub fn new(policy: AdminPolicy) -> Self {
        Self {
            slot: ADMIN_SLOT,
            policy,
        }
    }

    /// The slot the admin is stored in.
    #[must_use]
    pub fn slot(&self) -> StorageKey {
        self.slot
    }

    /// Active authorization policy.
    #[must_use]
    pub fn policy(&self) -> AdminPolicy {
        self.policy
    }

    /// Seeds the admin at construction.
    pub fn initialize<S: StateStore>(&self, store: &mut S, deployer: Address) -> Result<(), ProxyError> {
        if deployer.is_zero() {
            return Err(ProxyError::InvalidArgument(
                "deployer is the zero address".to_string(),
            ));
        }
        store.store(self.slot, StorageValue::from_address(deployer));
        Ok(())
    }

    /// Current admin.
    #[must_use]
    pub fn get<S: StateStore>(&self, store: &S) -> Address {
        store.load(&self.slot).to_address()
    }

    /// Fails with `Unauthorized` unless `caller` is admin-equivalent.
    pub fn authorize<S: StateStore>(
        &self,
        store: &S,
        caller: Address,
        proxy: Address,
    ) -> Result<(), ProxyError> {
        if caller == self.get(store) {
            return Ok(());
        }
        if self.policy == AdminPolicy::AdminOrSelf && caller == proxy {
            return Ok(());
        }
        Err(ProxyError::Unauthorized { caller })
    }

    /// Replaces the admin and records the change. Returns the previous admin.
    pub fn change<S: StateStore>(
        &self,
        store: &mut S,
        caller: Address,
        proxy: Address,
        new_admin: Address,
    ) -> Result<Address, ProxyError> {
        self.authorize(&*store, caller, proxy)?;
        if new_admin.is_zero() {
            return Err(ProxyError::InvalidArgument(
                "new admin is the zero address".to_string(),
            ));
        }

        let old_admin = self.get(&*store);
        store.store(self.slot, StorageValue::from_address(new_admin));
        store.record_audit(AuditRecord::AdminChanged {
            old_admin,
            new_admin,
        });
        Ok(old_admin)
    }
}

impl Default for AdminRegistry {
    fn default() -> Self {
        Self::new(AdminPolicy::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::ProxyStorage;

    const PROXY: Address = Address([0xEE; 20]);
    const ADMIN: Address = Address([0xAD; 20]);
    const OTHER: Address = Address([0x01; 20]);

    fn seeded(policy: AdminPolicy) -> (AdminRegistry, ProxyStorage) {
        let registry = AdminRegistry::new(policy);
        let mut storage = ProxyStorage::new();
        registry.initialize(&mut storage, ADMIN).unwrap();
        (registry, storage)
    }

    #[test]
    fn test_initialize_rejects_zero_deployer() {
        let registry = AdminRegistry::default();
        let mut storage = ProxyStorage::new();
        let result = registry.initialize(&mut storage, Address::ZERO);
        assert!(matches!(result, Err(ProxyError::InvalidArgument(_))));
    }

    #[test]
    fn test_admin_stored_in_fixed_slot() {
        let (registry, storage) = seeded(AdminPolicy::AdminOnly);
        assert_eq!(storage.load(&ADMIN_SLOT).to_address(), ADMIN);
        assert_eq!(registry.get(&storage), ADMIN);
    }

    #[test]
    fn test_authorize_admin_only() {
        let (registry, storage) = seeded(AdminPolicy::AdminOnly);
        assert!(registry.authorize(&storage, ADMIN, PROXY).is_ok());
        assert_eq!(
            registry.authorize(&storage, OTHER, PROXY),
            Err(ProxyError::Unauthorized { caller: OTHER })
        );
        assert!(registry.authorize(&storage, PROXY, PROXY).is_err());
    }

    #[test]
    fn test_authorize_admin_or_self() {
        let (registry, storage) = seeded(AdminPolicy::AdminOrSelf);
        assert!(registry.authorize(&storage, PROXY, PROXY).is_ok());
        assert!(registry.authorize(&storage, OTHER, PROXY).is_err());
    }

    #[test]
    fn test_change_admin_records_audit() {
        let (registry, mut storage) = seeded(AdminPolicy::AdminOnly);

        let old = registry.change(&mut storage, ADMIN, PROXY, OTHER).unwrap();

        assert_eq!(old, ADMIN);
        assert_eq!(registry.get(&storage), OTHER);
        assert_eq!(
            storage.audit_trail(),
            &[AuditRecord::AdminChanged {
                old_admin: ADMIN,
                new_admin: OTHER
            }]
        );

        // Previous admin lost its rights immediately.
        assert!(registry.authorize(&storage, ADMIN, PROXY).is_err());
    }

    #[test]
    fn test_change_admin_to_zero_rejected() {
        let (registry, mut storage) = seeded(AdminPolicy::AdminOnly);
        let result = registry.change(&mut storage, ADMIN, PROXY, Address::ZERO);

        assert!(matches!(result, Err(ProxyError::InvalidArgument(_))));
        assert_eq!(registry.get(&storage), ADMIN);
        assert!(storage.audit_trail().is_empty());
    }

    #[test]
    fn test_change_admin_by_stranger_rejected() {
        let (registry, mut storage) = seeded(AdminPolicy::AdminOnly);
        let result = registry.change(&mut storage, OTHER, PROXY, OTHER);
        assert_eq!(result, Err(ProxyError::Unauthorized { caller: OTHER }));
        assert_eq!(registry.get(&storage), ADMIN);
    }
}
