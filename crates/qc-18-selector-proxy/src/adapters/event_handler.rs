//! # Event Handler Adapter
//!
//! Translates inbound bus payloads into calls on the driving port and
//! the results back into response payloads. Failures are reported inside
//! the response; the handler itself never fails.

use crate::domain::entities::AdminCall;
use crate::events::{
    AdminRequestPayload, AdminResponsePayload, InvokeRequestPayload, InvokeResponsePayload,
};
use crate::ports::inbound::SelectorProxyApi;
use std::sync::Arc;

/// Event handler for Selector Proxy requests.
pub struct SelectorProxyEventHandler<T: SelectorProxyApi> {
    /// The selector proxy API implementation.
    api: Arc<T>,
}

impl<T: SelectorProxyApi> SelectorProxyEventHandler<T> {
    /// Create a new event handler.
    pub fn new(api: Arc<T>) -> Self {
        Self { api }
    }

    /// Handle an `InvokeRequest`.
    pub async fn handle_invoke(&self, payload: InvokeRequestPayload) -> InvokeResponsePayload {
        InvokeResponsePayload::from_result(self.api.invoke(payload.into()).await)
    }

    /// Handle an `AdminRequest`.
    pub async fn handle_admin(&self, payload: AdminRequestPayload) -> AdminResponsePayload {
        let caller = payload.caller;
        let result = match payload.call {
            AdminCall::SharpCut { selector, target } => {
                self.api.sharp_cut(caller, selector, target).await
            }
            AdminCall::Restrict { selector, allowed } => {
                self.api.restrict(caller, selector, allowed).await
            }
            AdminCall::ChangeAdmin { new_admin } => self.api.change_admin(caller, new_admin).await,
        };
        AdminResponsePayload::from_result(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
