//! # Facet Registry Adapter
//!
//! In-memory map from target address to deployed facet.
//! A production node would back this with its code store.

use crate::domain::value_objects::{Address, Bytes};
use crate::errors::FacetFailure;
use crate::ports::outbound::{Facet, FacetResolver};
use crate::router::ProxyContext;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// In-memory facet deployments.
#[derive(Default)]
pub struct InMemoryFacetRegistry {
    facets: RwLock<HashMap<Address, Arc<dyn Facet>>>,
}

impl InMemoryFacetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `facet` at `address`, replacing whatever was there.
    pub fn deploy(&self, address: Address, facet: Arc<dyn Facet>) -> Option<Arc<dyn Facet>> {
        debug!(?address, facet = facet.name(), "Facet deployed");
        self.facets.write().insert(address, facet)
    }

    /// Remove the facet at `address`.
    pub fn undeploy(&self, address: &Address) -> Option<Arc<dyn Facet>> {
        self.facets.write().remove(address)
    }

    /// Whether a facet is deployed at `address`.
    #[must_use]
    pub fn is_deployed(&self, address: &Address) -> bool {
        self.facets.read().contains_key(address)
    }

    /// Number of deployed facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.read().len()
    }

    /// True when nothing is deployed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.read().is_empty()
    }
}

impl FacetResolver for InMemoryFacetRegistry {
    fn resolve(&self, address: &Address) -> Option<Arc<dyn Facet>> {
        self.facets.read().get(address).cloned()
    }
}

impl std::fmt::Debug for InMemoryFacetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFacetRegistry")
            .field("deployed", &self.len())
            .finish()
    }
}

// =============================================================================
// CLOSURE FACET
// =============================================================================

type FacetFn = dyn Fn(&mut ProxyContext<'_, '_>) -> Result<Bytes, FacetFailure> + Send + Sync;

/// A facet built from a closure.
pub struct FnFacet {
    name: String,
    body: Box<FacetFn>,
}

impl FnFacet {
    /// Wrap `body` as a facet called `name`.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut ProxyContext<'_, '_>) -> Result<Bytes, FacetFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }
}

impl Facet for FnFacet {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut ProxyContext<'_, '_>) -> Result<Bytes, FacetFailure> {
        (self.body)(ctx)
    }
}

impl std::fmt::Debug for FnFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFacet").field("name", &self.name).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
