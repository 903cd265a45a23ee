//! # Selector Proxy Service
//!
//! Async service wrapping one [`SelectorProxy`] for use from the event bus
//! and from other in-process callers.
//!
//! ## Concurrency
//!
//! - Invocations and admin calls hold the write guard for their whole run,
//!   so they are applied one at a time in lock order
//! - Reads take the read guard
//! - Before releasing the write guard a caller takes the publish guard, so
//!   audit records reach the sink in commit order
//! - A sink failure is logged and counted, never rolled back

use crate::adapters::{InMemoryAuditSink, InMemoryFacetRegistry};
use crate::domain::config::ProxyConfig;
use crate::domain::entities::{AdminCall, AuditRecord, DispatchOutcome, Invocation};
use crate::domain::value_objects::{Address, Selector, StorageKey, StorageValue, U256};
use crate::errors::{ConfigError, ProxyError};
use crate::events::{
    AdminRequestPayload, AdminResponsePayload, AuditEventPayload, InvokeRequestPayload,
    InvokeResponsePayload,
};
use crate::metrics;
use crate::ports::inbound::SelectorProxyApi;
use crate::ports::outbound::{AuditSink, FacetResolver};
use crate::router::SelectorProxy;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Selector Proxy Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Proxy configuration.
    pub proxy: ProxyConfig,
    /// Upper bound on a single audit publish, in milliseconds.
    pub audit_publish_timeout_ms: u64,
}

/// Environment variable bounding a single audit publish, in milliseconds.
pub const ENV_AUDIT_PUBLISH_TIMEOUT_MS: &str = "QC_PROXY_AUDIT_PUBLISH_TIMEOUT_MS";

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            audit_publish_timeout_ms: 1000,
        }
    }
}

impl ServiceConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            proxy: ProxyConfig::from_vars(&lookup)?,
            ..Self::default()
        };
        if let Some(raw) = lookup(ENV_AUDIT_PUBLISH_TIMEOUT_MS) {
            config.audit_publish_timeout_ms = match raw.trim().parse() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ConfigError::Env {
                        var: ENV_AUDIT_PUBLISH_TIMEOUT_MS,
                        value: raw,
                    })
                }
            };
        }
        Ok(config)
    }
}

/// Statistics for the Selector Proxy Service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Invocations received, deposits included.
    pub invocations: u64,
    /// Invocations that committed.
    pub successful_invocations: u64,
    /// Invocations that failed and were discarded.
    pub failed_invocations: u64,
    /// Bare deposits accepted.
    pub deposits: u64,
    /// Admin operations committed.
    pub admin_mutations: u64,
    /// Admin operations rejected.
    pub rejected_admin_calls: u64,
    /// Audit records the sink failed to accept.
    pub audit_publish_failures: u64,
}

/// The main Selector Proxy Service.
pub struct SelectorProxyService<R: FacetResolver, A: AuditSink> {
    /// Service configuration.
    config: ServiceConfig,
    /// The proxy and its committed state.
    proxy: Arc<RwLock<SelectorProxy>>,
    /// Where facets are deployed.
    facets: Arc<R>,
    /// Where committed audit records go.
    audit: Arc<A>,
    /// Held across publishing so the sink sees records in commit order.
    publish: Mutex<()>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<R: FacetResolver, A: AuditSink> SelectorProxyService<R, A> {
    /// Deploy a proxy at `address` owned by `deployer` and wrap it.
    pub fn new(
        address: Address,
        deployer: Address,
        facets: Arc<R>,
        audit: Arc<A>,
        config: ServiceConfig,
    ) -> Result<Self, ProxyError> {
        let proxy = SelectorProxy::deploy(address, deployer, config.proxy.clone())?;
        Ok(Self {
            config,
            proxy: Arc::new(RwLock::new(proxy)),
            facets,
            audit,
            publish: Mutex::new(()),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        })
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// The facet resolver.
    #[must_use]
    pub fn facets(&self) -> &Arc<R> {
        &self.facets
    }

    /// The audit sink.
    #[must_use]
    pub fn audit_sink(&self) -> &Arc<A> {
        &self.audit
    }

    /// Address of the wrapped proxy.
    pub async fn address(&self) -> Address {
        self.proxy.read().await.address()
    }

    /// Read a proxy storage slot.
    pub async fn sload(&self, key: &StorageKey) -> StorageValue {
        self.proxy.read().await.sload(key)
    }

    /// Audit trail from position `from` on, as bus payloads.
    pub async fn audit_events(&self, from: u64) -> Vec<AuditEventPayload> {
        let proxy = self.proxy.read().await;
        let address = proxy.address();
        proxy
            .audit_trail()
            .iter()
            .enumerate()
            .skip(usize::try_from(from).unwrap_or(usize::MAX))
            .map(|(sequence, record)| AuditEventPayload {
                proxy: address,
                sequence: sequence as u64,
                record: record.clone(),
            })
            .collect()
    }

    /// Handle an `InvokeRequest` from the event bus.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id))]
    pub async fn handle_invoke(
        &self,
        correlation_id: Uuid,
        payload: InvokeRequestPayload,
    ) -> InvokeResponsePayload {
        debug!(caller = ?payload.caller, len = payload.data.len(), "Processing invoke request");
        InvokeResponsePayload::from_result(self.invoke(payload.into()).await)
    }

    /// Handle an `AdminRequest` from the event bus.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id))]
    pub async fn handle_admin(
        &self,
        correlation_id: Uuid,
        payload: AdminRequestPayload,
    ) -> AdminResponsePayload {
        info!(
            caller = ?payload.caller,
            operation = payload.call.name(),
            "Processing admin request"
        );
        AdminResponsePayload::from_result(self.admin(payload.caller, payload.call).await)
    }

    /// Run one admin call under the write guard. Returns the replaced value.
    async fn admin(&self, caller: Address, call: AdminCall) -> Result<Address, ProxyError> {
        let mut proxy = self.proxy.write().await;
        let before = proxy.audit_trail().len();
        let result = match call {
            AdminCall::SharpCut { selector, target } => proxy.sharp_cut(caller, selector, target),
            AdminCall::Restrict { selector, allowed } => {
                proxy.restrict(caller, selector, allowed)
            }
            AdminCall::ChangeAdmin { new_admin } => proxy.change_admin(caller, new_admin),
        };

        match result {
            Ok(previous) => {
                let records = proxy.audit_trail()[before..].to_vec();
                let publish = self.publish.lock().await;
                drop(proxy);

                metrics::record_admin_mutation(call.name());
                self.stats.write().await.admin_mutations += 1;
                self.publish_audit(&records).await;
                drop(publish);
                Ok(previous)
            }
            Err(err) => {
                drop(proxy);
                warn!(?caller, operation = call.name(), error = %err, "Admin call rejected");
                self.stats.write().await.rejected_admin_calls += 1;
                Err(err)
            }
        }
    }

    /// Forward committed records to the sink.
    async fn publish_audit(&self, records: &[AuditRecord]) {
        let timeout = Duration::from_millis(self.config.audit_publish_timeout_ms);
        for record in records {
            let failure = match tokio::time::timeout(timeout, self.audit.publish(record)).await {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(_) => format!("publish timed out after {}ms", timeout.as_millis()),
            };
            warn!(?record, error = %failure, "Audit sink failed, record kept in proxy trail");
            metrics::record_audit_publish_failure();
            self.stats.write().await.audit_publish_failures += 1;
        }
    }
}

/// Create a service with in-memory adapters (for testing).
pub fn create_test_service(
    address: Address,
    admin: Address,
) -> Result<SelectorProxyService<InMemoryFacetRegistry, InMemoryAuditSink>, ProxyError> {
    SelectorProxyService::new(
        address,
        admin,
        Arc::new(InMemoryFacetRegistry::new()),
        Arc::new(InMemoryAuditSink::new()),
        ServiceConfig::default(),
    )
}

// =============================================================================
// SelectorProxyApi Implementation
// =============================================================================

#[async_trait]
impl<R: FacetResolver, A: AuditSink> SelectorProxyApi for SelectorProxyService<R, A> {
    async fn sharp_cut(
        &self,
        caller: Address,
        selector: Selector,
        target: Address,
    ) -> Result<Address, ProxyError> {
        self.admin(caller, AdminCall::SharpCut { selector, target })
            .await
    }

    async fn restrict(
        &self,
        caller: Address,
        selector: Selector,
        allowed: Address,
    ) -> Result<Address, ProxyError> {
        self.admin(caller, AdminCall::Restrict { selector, allowed })
            .await
    }

    async fn change_admin(
        &self,
        caller: Address,
        new_admin: Address,
    ) -> Result<Address, ProxyError> {
        self.admin(caller, AdminCall::ChangeAdmin { new_admin }).await
    }

    async fn get_target(&self, selector: Selector) -> Result<Address, ProxyError> {
        Ok(self.proxy.read().await.get_target(selector))
    }

    async fn get_restriction(&self, selector: Selector) -> Result<Address, ProxyError> {
        Ok(self.proxy.read().await.get_restriction(selector))
    }

    async fn get_admin(&self) -> Result<Address, ProxyError> {
        Ok(self.proxy.read().await.get_admin())
    }

    async fn balance(&self) -> Result<U256, ProxyError> {
        Ok(self.proxy.read().await.balance())
    }

    async fn invoke(&self, invocation: Invocation) -> Result<DispatchOutcome, ProxyError> {
        let mut proxy = self.proxy.write().await;
        let result = proxy.invoke(self.facets.as_ref(), &invocation);
        let publish = self.publish.lock().await;
        drop(proxy);

        {
            let mut stats = self.stats.write().await;
            stats.invocations += 1;
            match &result {
                Ok(outcome) => {
                    stats.successful_invocations += 1;
                    if outcome.is_deposit() {
                        stats.deposits += 1;
                    }
                }
                Err(_) => stats.failed_invocations += 1,
            }
        }

        match &result {
            Ok(outcome) => {
                metrics::record_dispatch("ok");
                if outcome.is_deposit() {
                    metrics::record_deposit();
                }
                debug!(
                    selector = ?outcome.selector,
                    target = ?outcome.target,
                    logs = outcome.logs.len(),
                    "Invocation committed"
                );
                self.publish_audit(&outcome.audit).await;
            }
            Err(err) => {
                metrics::record_dispatch(err.kind());
                debug!(caller = ?invocation.caller, error = %err, "Invocation discarded");
            }
        }
        drop(publish);
        result
    }
}

// =============================================================================
// TESTS
// =============================================================================
