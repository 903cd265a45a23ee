//! # Event Schema (EDA Compliance)
//!
//! IPC message payloads for the Selector Proxy. These messages are wrapped
//! in the bus envelope for transport; the correlation id lives in the
//! envelope, not in the payload.
//!
//! | Message Type | Direction |
//! |--------------|-----------|
//! | `InvokeRequest` | inbound |
//! | `InvokeResponse` | outbound |
//! | `AdminRequest` | inbound |
//! | `AdminResponse` | outbound |
//! | `AuditEvent` | outbound, one per committed audit record |

use crate::domain::entities::{AdminCall, AuditRecord, DispatchOutcome, Invocation, Log, StateChange};
use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::ProxyError;
use serde::{Deserialize, Serialize};

// =============================================================================
// INBOUND EVENTS
// =============================================================================

/// Request to run an invocation against the proxy's default entrypoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequestPayload {
    /// Immediate caller.
    pub caller: Address,
    /// Value sent with the call.
    pub value: U256,
    /// Calldata. Empty for a bare deposit.
    pub data: Bytes,
}

impl From<InvokeRequestPayload> for Invocation {
    fn from(payload: InvokeRequestPayload) -> Self {
        Self {
            caller: payload.caller,
            value: payload.value,
            data: payload.data,
        }
    }
}

/// Request to run an admin operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequestPayload {
    /// Immediate caller, checked against the admin.
    pub caller: Address,
    /// The operation.
    pub call: AdminCall,
}

// =============================================================================
// OUTBOUND EVENTS
// =============================================================================

/// Response to an invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeResponsePayload {
    /// Whether the invocation committed.
    pub success: bool,
    /// Dispatched selector (`None` for a deposit or a failure).
    pub selector: Option<Selector>,
    /// Resolved target.
    pub target: Option<Address>,
    /// Facet output, unmodified.
    pub output: Bytes,
    /// Logs emitted by the facet.
    pub logs: Vec<Log>,
    /// Applied state changes.
    pub state_changes: Vec<StateChange>,
    /// Audit records appended by the invocation.
    pub audit: Vec<AuditRecord>,
    /// Error kind label (if failed).
    pub error_kind: Option<String>,
    /// Error message (if failed).
    pub error: Option<String>,
    /// Structured facet failure payload (if the facet failed).
    pub failure_data: Option<Bytes>,
}

impl InvokeResponsePayload {
    /// Build a response from an invocation result.
    #[must_use]
    pub fn from_result(result: Result<DispatchOutcome, ProxyError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                selector: outcome.selector,
                target: outcome.target,
                output: outcome.output,
                logs: outcome.logs,
                state_changes: outcome.state_changes,
                audit: outcome.audit,
                ..Self::default()
            },
            Err(err) => {
                let failure_data = match &err {
                    ProxyError::TargetFailure(failure) => Some(failure.data.clone()),
                    _ => None,
                };
                Self {
                    error_kind: Some(err.kind().to_string()),
                    error: Some(err.to_string()),
                    failure_data,
                    ..Self::default()
                }
            }
        }
    }
}

/// Response to an admin operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminResponsePayload {
    /// Whether the operation committed.
    pub success: bool,
    /// Value the operation replaced: previous target, restriction or admin.
    pub previous: Option<Address>,
    /// Error kind label (if failed).
    pub error_kind: Option<String>,
    /// Error message (if failed).
    pub error: Option<String>,
}

impl AdminResponsePayload {
    /// Build a response from an admin result.
    #[must_use]
    pub fn from_result(result: Result<Address, ProxyError>) -> Self {
        match result {
            Ok(previous) => Self {
                success: true,
                previous: Some(previous),
                ..Self::default()
            },
            Err(err) => Self {
                error_kind: Some(err.kind().to_string()),
                error: Some(err.to_string()),
                ..Self::default()
            },
        }
    }
}

/// One committed audit record, published after commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventPayload {
    /// Proxy that recorded the event.
    pub proxy: Address,
    /// Position in the proxy's audit trail, starting at 0.
    pub sequence: u64,
    /// The record.
    pub record: AuditRecord,
}

// =============================================================================
// EVENT BUS TOPICS
// =============================================================================

/// Event topics for the Selector Proxy subsystem.
pub mod topics {
    /// Topic for receiving invocation requests.
    pub const INVOKE_REQUEST: &str = "selector_proxy.invoke.request";

    /// Topic for publishing invocation responses.
    pub const INVOKE_RESPONSE: &str = "selector_proxy.invoke.response";

    /// Topic for receiving admin requests.
    pub const ADMIN_REQUEST: &str = "selector_proxy.admin.request";

    /// Topic for publishing admin responses.
    pub const ADMIN_RESPONSE: &str = "selector_proxy.admin.response";

    /// Topic for committed audit records.
    pub const AUDIT: &str = "selector_proxy.audit";

    /// Dead letter queue for undeliverable audit records.
    pub const DLQ: &str = "dlq.selector_proxy";
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FacetFailure;

    #[test]
    fn test_invoke_request_into_invocation() {
        let payload = InvokeRequestPayload {
            caller: Address::new([1u8; 20]),
            value: U256::from(3),
            data: Bytes::from_slice(&[0xAA, 0xAA, 0xAA, 0xAA]),
        };
        let inv: Invocation = payload.into();
        assert_eq!(inv.selector(), Some(Selector::from_u32(0xAAAA_AAAA)));
        assert_eq!(inv.value, U256::from(3));
    }

    #[test]
    fn test_failure_response_carries_payload() {
        let err = ProxyError::TargetFailure(FacetFailure::with_data(
            "boom",
            Bytes::from_slice(&[1, 2]),
        ));
        let response = InvokeResponsePayload::from_result(Err(err));

        assert!(!response.success);
        assert_eq!(response.error_kind.as_deref(), Some("target_failure"));
        assert_eq!(response.failure_data, Some(Bytes::from_slice(&[1, 2])));
    }

    #[test]
    fn test_admin_response_serialization() {
        let response = AdminResponsePayload::from_result(Ok(Address::new([1u8; 20])));

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: AdminResponsePayload = serde_json::from_str(&serialized).unwrap();
        assert!(deserialized.success);
        assert_eq!(deserialized.previous, Some(Address::new([1u8; 20])));

        let rejected =
            AdminResponsePayload::from_result(Err(ProxyError::Unauthorized { caller: Address::ZERO }));
        assert_eq!(rejected.error_kind.as_deref(), Some("unauthorized"));
    }

    #[test]
    fn test_admin_request_serialization() {
        let request = AdminRequestPayload {
            caller: Address::new([1u8; 20]),
            call: AdminCall::Restrict {
                selector: Selector::from_u32(7),
                allowed: Address::new([2u8; 20]),
            },
        };
        let serialized = serde_json::to_string(&request).unwrap();
        assert!(serialized.contains("Restrict"));
    }

    #[test]
    fn test_topics_namespaced() {
        assert!(topics::INVOKE_REQUEST.starts_with("selector_proxy."));
        assert!(topics::AUDIT.starts_with("selector_proxy."));
    }
}
