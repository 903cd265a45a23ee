//! # Core Domain Entities
//!
//! Main business entities for selector routing: inbound invocations,
//! administrative calls, audit records and dispatch outcomes.

use crate::domain::value_objects::{Address, Bytes, Hash, Selector, StorageKey, StorageValue, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// INVOCATION
// =============================================================================

/// An inbound call against the proxy's default entrypoint.
///
/// Empty `data` is a bare value deposit; anything else must start with a
/// 4-byte selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Identity of the immediate caller.
    pub caller: Address,
    /// Value transferred with the call.
    pub value: U256,
    /// Calldata: selector followed by arguments.
    pub data: Bytes,
}

impl Invocation {
    /// Creates a call to `selector` with `args` and no value.
    #[must_use]
    pub fn call(caller: Address, selector: Selector, args: &[u8]) -> Self {
        Self {
            caller,
            value: U256::zero(),
            data: Bytes::with_selector(selector, args),
        }
    }

    /// Creates a bare deposit (no selector, no payload).
    #[must_use]
    pub fn deposit(caller: Address, value: U256) -> Self {
        Self {
            caller,
            value,
            data: Bytes::new(),
        }
    }

    /// Attaches a value transfer.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Returns true when this invocation carries no payload at all.
    #[must_use]
    pub fn is_bare_deposit(&self) -> bool {
        self.data.is_empty()
    }

    /// Selector at the head of the calldata, if present.
    #[must_use]
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_calldata(self.data.as_slice())
    }
}

// =============================================================================
// ADMIN CALLS
// =============================================================================

/// An administrative mutation of the proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminCall {
    /// Add, update or remove (`target = ZERO`) a route.
    SharpCut {
        /// Selector to bind.
        selector: Selector,
        /// New target.
        target: Address,
    },
    /// Set or clear (`allowed = ZERO`) the caller restriction of a selector.
    Restrict {
        /// Selector to restrict.
        selector: Selector,
        /// The single allowed caller.
        allowed: Address,
    },
    /// Transfer control to a new admin.
    ChangeAdmin {
        /// Incoming admin, must not be ZERO.
        new_admin: Address,
    },
}

impl AdminCall {
    /// Operation name for logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SharpCut { .. } => "sharp_cut",
            Self::Restrict { .. } => "restrict",
            Self::ChangeAdmin { .. } => "change_admin",
        }
    }
}

// =============================================================================
// AUDIT RECORDS
// =============================================================================

/// Append-only audit record, externally observable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditRecord {
    /// Emitted on every `sharp_cut`, no-ops included.
    RouteChanged {
        /// Affected selector.
        selector: Selector,
        /// Target before the cut.
        old_target: Address,
        /// Target after the cut.
        new_target: Address,
    },
    /// Emitted on every successful `change_admin`.
    AdminChanged {
        /// Admin before the change.
        old_admin: Address,
        /// Admin after the change.
        new_admin: Address,
    },
}

// =============================================================================
// LOG (EVENT)
// =============================================================================

/// Log emitted by a facet while running against the proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Emitting address. Always the proxy, since facets run in its context.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    pub data: Bytes,
}

impl Log {
    /// Creates a new log.
    #[must_use]
    pub fn new(address: Address, topics: Vec<Hash>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }
}

// =============================================================================
// STATE CHANGE
// =============================================================================

/// A single change to proxy state, collected during an invocation and
/// applied atomically on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Write to a storage slot of the proxy.
    StorageWrite {
        /// Slot key.
        key: StorageKey,
        /// New value.
        value: StorageValue,
    },
    /// Value credited to the proxy.
    ValueReceived {
        /// Sender of the value.
        from: Address,
        /// Amount credited.
        amount: U256,
    },
    /// Value paid out by the proxy.
    ValueSent {
        /// Recipient.
        to: Address,
        /// Amount debited.
        amount: U256,
    },
}

// =============================================================================
// DISPATCH OUTCOME
// =============================================================================

/// Result of a committed invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Selector that was dispatched (`None` for a bare deposit).
    pub selector: Option<Selector>,
    /// Target the selector resolved to (`None` for a bare deposit).
    pub target: Option<Address>,
    /// The facet's return data, unmodified.
    pub output: Bytes,
    /// Logs emitted by the facet.
    pub logs: Vec<Log>,
    /// Changes applied to proxy state.
    pub state_changes: Vec<StateChange>,
    /// Audit records appended by this invocation.
    pub audit: Vec<AuditRecord>,
}

impl DispatchOutcome {
    /// Returns true for the bare deposit path.
    #[must_use]
    pub fn is_deposit(&self) -> bool {
        self.selector.is_none()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_call_builds_calldata() {
        let caller = Address::new([1u8; 20]);
        let inv = Invocation::call(caller, Selector::from_u32(0x0102_0304), &[0xFF]);

        assert_eq!(inv.data.as_slice(), &[1, 2, 3, 4, 0xFF]);
        assert_eq!(inv.selector(), Some(Selector::from_u32(0x0102_0304)));
        assert!(!inv.is_bare_deposit());
        assert!(inv.value.is_zero());
    }

    #[test]
    fn test_invocation_deposit() {
        let inv = Invocation::deposit(Address::new([1u8; 20]), U256::from(5));
        assert!(inv.is_bare_deposit());
        assert_eq!(inv.selector(), None);
        assert_eq!(inv.value, U256::from(5));
    }

    #[test]
    fn test_admin_call_names() {
        let cut = AdminCall::SharpCut {
            selector: Selector::from_u32(1),
            target: Address::ZERO,
        };
        assert_eq!(cut.name(), "sharp_cut");
        assert_eq!(
            AdminCall::ChangeAdmin {
                new_admin: Address::ZERO
            }
            .name(),
            "change_admin"
        );
    }

    #[test]
    fn test_audit_record_serialization() {
        let record = AuditRecord::RouteChanged {
            selector: Selector::from_u32(0xAAAA_AAAA),
            old_target: Address::ZERO,
            new_target: Address::new([2u8; 20]),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("RouteChanged"));
        let back: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_outcome_is_deposit() {
        assert!(DispatchOutcome::default().is_deposit());
        let routed = DispatchOutcome {
            selector: Some(Selector::from_u32(1)),
            ..DispatchOutcome::default()
        };
        assert!(!routed.is_deposit());
    }
}
