//! # Domain Services
//!
//! Pure functions for the proxy's storage layout.
//!
//! The admin lives at the EIP-1967 admin slot so external tooling can find
//! it without knowing anything else about the layout. Both tables use the
//! Solidity mapping layout `keccak256(key ‖ base)` under namespaced bases,
//! which keeps them clear of each other and of facet-chosen slots.

use crate::domain::value_objects::{Hash, Selector, StorageKey, U256};
use sha3::{Digest, Keccak256};

/// Namespace hashed into the admin slot (EIP-1967).
pub const ADMIN_SLOT_NAMESPACE: &str = "eip1967.proxy.admin";

/// Namespace for the selector → target mapping.
pub const SELECTOR_TABLE_NAMESPACE: &str = "qc.selector-proxy.selectors";

/// Namespace for the selector → allowed caller mapping.
pub const RESTRICTION_TABLE_NAMESPACE: &str = "qc.selector-proxy.restrictions";

/// `keccak256("eip1967.proxy.admin") - 1`.
pub const ADMIN_SLOT: StorageKey = StorageKey([
    0xb5, 0x31, 0x27, 0x68, 0x4a, 0x56, 0x8b, 0x31, 0x73, 0xae, 0x13, 0xb9, 0xf8, 0xa6, 0x01,
    0x6e, 0x24, 0x3e, 0x63, 0xb6, 0xe8, 0xee, 0x11, 0x78, 0xd6, 0xa7, 0x17, 0x85, 0x0b, 0x5d,
    0x61, 0x03,
]);

/// Computes Keccak-256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let result = Keccak256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// `keccak256(namespace) - 1`, the EIP-1967 slot derivation.
///
/// Subtracting one removes the known preimage, so no mapping entry can
/// land on the slot.
#[must_use]
pub fn namespaced_slot(namespace: &str) -> StorageKey {
    let digest = U256::from_big_endian(keccak256(namespace.as_bytes()).as_bytes());
    StorageKey::from_u256(digest.overflowing_sub(U256::one()).0)
}

/// Slot of `mapping[selector]` for a mapping rooted at `base`.
#[must_use]
pub fn mapping_slot(selector: Selector, base: StorageKey) -> StorageKey {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&selector.to_word());
    preimage[32..].copy_from_slice(base.as_bytes());
    StorageKey::new(keccak256(&preimage).0)
}

// =============================================================================
// TESTS
// =============================================================================
