//! Document provider boundary and index lifecycle.
//!
//! The index is built from one snapshot and never patched. When the provider
//! reports a newer generation, resolution fails fast with
//! [`ResolutionError::StaleIndex`] until [`Session::refresh`] rebuilds it.

use crate::index::PageIndex;
use crate::resolution::{Resolution, ResolutionEngine, ResolutionError, TargetRequirement};
use legend_common::PageSnapshot;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Document provider failed: {0}")]
pub struct ProviderError(pub String);

/// Supplies rendered documents. Implemented by the browser-facing layer.
pub trait DocumentProvider {
    /// Current document version; bumped on every mutation.
    fn generation(&self) -> u64;

    fn snapshot(&self) -> Result<PageSnapshot, ProviderError>;
}

/// A provider serving one fixed snapshot, e.g. loaded from a file.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    snapshot: PageSnapshot,
}

impl StaticProvider {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self { snapshot }
    }
}

impl DocumentProvider for StaticProvider {
    fn generation(&self) -> u64 {
        self.snapshot.generation
    }

    fn snapshot(&self) -> Result<PageSnapshot, ProviderError> {
        Ok(self.snapshot.clone())
    }
}

/// Resolves locators against a provider, caching the published index.
pub struct Session<P: DocumentProvider> {
    provider: P,
    engine: ResolutionEngine,
    index: Option<Arc<PageIndex>>,
}

impl<P: DocumentProvider> Session<P> {
    pub fn new(provider: P, engine: ResolutionEngine) -> Self {
        Self {
            provider,
            engine,
            index: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    /// The published index, if one has been built.
    pub fn index(&self) -> Option<Arc<PageIndex>> {
        self.index.clone()
    }

    /// Build a fresh index from the provider's current snapshot.
    pub fn refresh(&mut self) -> Result<Arc<PageIndex>, ResolutionError> {
        let snapshot = self.provider.snapshot()?;
        let index = Arc::new(PageIndex::build(&snapshot));
        info!(generation = index.generation(), "Published page index");
        self.index = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The current index, built on first use. Errors when the provider moved
    /// on since the index was built.
    pub fn current_index(&mut self) -> Result<Arc<PageIndex>, ResolutionError> {
        let index = match &self.index {
            Some(index) => Arc::clone(index),
            None => self.refresh()?,
        };

        let document_generation = self.provider.generation();
        if index.generation() != document_generation {
            warn!(
                index_generation = index.generation(),
                document_generation, "Page index is stale"
            );
            return Err(ResolutionError::StaleIndex {
                index_generation: index.generation(),
                document_generation,
            });
        }

        Ok(index)
    }

    pub fn resolve(
        &mut self,
        locator: &str,
        requirement: TargetRequirement,
    ) -> Result<Resolution, ResolutionError> {
        let locator = self.engine.compile(locator)?;
        let index = self.current_index()?;
        Ok(self.engine.resolve_locator(&index, &locator, requirement))
    }
}
