//! Adapter registry and dispatch
//!
//! Built once at startup and passed by reference into dispatch and build
//! calls. Registration order is dispatch priority, so a class claimed by
//! two adapters always goes to the one registered first.

use tracing::{debug, span, trace, warn, Level};

use super::adapter::ModelAdapter;
use super::catalog::ClassHandle;
use super::error::{ErdError, Result};

/// Ordered set of model adapters
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn ModelAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Append an adapter with the lowest priority so far
    pub fn register(&mut self, adapter: Box<dyn ModelAdapter>) {
        if self.get(adapter.name()).is_some() {
            warn!(adapter = adapter.name(), "Adapter name registered twice");
        }
        debug!(
            adapter = adapter.name(),
            priority = self.adapters.len(),
            "Registered model adapter"
        );
        self.adapters.push(adapter);
    }

    /// Builder-style registration
    pub fn with_adapter(mut self, adapter: Box<dyn ModelAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapters in priority order
    pub fn adapters(&self) -> impl Iterator<Item = &dyn ModelAdapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }

    /// Adapter names in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn ModelAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Whether any adapter claims the class
    pub fn claims(&self, class: &ClassHandle<'_>) -> bool {
        self.adapters.iter().any(|a| a.is_model(class))
    }

    /// First adapter, in priority order, that claims the class
    pub fn resolve_adapter(&self, class: &ClassHandle<'_>) -> Result<&dyn ModelAdapter> {
        let dispatch_span = span!(Level::TRACE, "resolve_adapter", class = %class);
        let _enter = dispatch_span.enter();

        for adapter in &self.adapters {
            let claimed = adapter.is_model(class);
            trace!(adapter = adapter.name(), claimed, "Checking adapter");
            if claimed {
                return Ok(adapter.as_ref());
            }
        }

        trace!("No adapter claims class");
        Err(ErdError::unknown_model(class.qualified_name()))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
