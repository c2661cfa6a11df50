//! Operator registry: maps operator ids to descriptors and implementations.
//!
//! The process-wide registry is published once from the built-in table and is
//! read-only afterwards, so concurrent runs read it without locking.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use operators::{Operator, OperatorDescriptor};
use tracing::{debug, info};

use crate::EngineError;

static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();

/// A registered operator: its immutable descriptor and its implementation.
#[derive(Clone)]
pub struct RegisteredOperator {
    pub descriptor: OperatorDescriptor,
    pub implementation: Arc<dyn Operator>,
}

impl std::fmt::Debug for RegisteredOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredOperator")
            .field("id", &self.descriptor.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct OperatorRegistry {
    entries: Vec<RegisteredOperator>,
    index: HashMap<String, usize>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in operator.
    pub fn with_builtins() -> Result<Self, EngineError> {
        let mut registry = Self::new();
        for (descriptor, implementation) in operators::builtin::builtin() {
            registry.register(descriptor, implementation)?;
        }
        info!(operators = registry.len(), "registered built-in operators");
        Ok(registry)
    }

    /// The process-wide registry, built from the built-in table on first use.
    ///
    /// Threads racing on first use may each build a registry; only one is
    /// stored and every caller observes that same instance.
    pub fn global() -> Result<&'static OperatorRegistry, EngineError> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(registry);
        }
        let built = Self::with_builtins()?;
        Ok(GLOBAL.get_or_init(|| built))
    }

    /// Register `implementation` under `descriptor.id`.
    ///
    /// # Errors
    /// [`EngineError::DuplicateOperator`] if the id is already taken.
    pub fn register(
        &mut self,
        descriptor: OperatorDescriptor,
        implementation: Arc<dyn Operator>,
    ) -> Result<(), EngineError> {
        if self.index.contains_key(&descriptor.id) {
            return Err(EngineError::DuplicateOperator(descriptor.id));
        }
        debug!(id = %descriptor.id, "registering operator");
        self.index.insert(descriptor.id.clone(), self.entries.len());
        self.entries.push(RegisteredOperator {
            descriptor,
            implementation,
        });
        Ok(())
    }

    /// # Errors
    /// [`EngineError::OperatorNotFound`] (without a node id) if `id` is unknown.
    pub fn lookup(&self, id: &str) -> Result<&RegisteredOperator, EngineError> {
        self.index
            .get(id)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| EngineError::OperatorNotFound {
                node_id: None,
                operator_id: id.to_owned(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Snapshot of every descriptor, in registration order.
    pub fn list(&self) -> Vec<OperatorDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
