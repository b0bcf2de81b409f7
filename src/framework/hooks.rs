//! # Lifecycle Hooks
//!
//! Every transport-backed operation of a resource runs through a named hook
//! point. Hooks are an ordered list of callables per `(Operation, Phase)`,
//! so cross-cutting behavior can be attached without touching the engine.

use std::fmt;
use std::sync::Arc;

use crate::framework::resource::{Resource, ResourceKind};

/// The operation a hook is attached to.
///
/// `Save` wraps both `Create` and `Update`, which run inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Find,
    Save,
    Create,
    Update,
    Destroy,
    Link,
    Unlink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

pub type Hook<K> = Arc<dyn Fn(&mut Resource<K>) + Send + Sync>;

/// Ordered hook registrations for one resource kind or instance.
pub struct Hooks<K: ResourceKind> {
    entries: Vec<(Operation, Phase, Hook<K>)>,
}

impl<K: ResourceKind> Hooks<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn before(
        mut self,
        operation: Operation,
        hook: impl Fn(&mut Resource<K>) + Send + Sync + 'static,
    ) -> Self {
        self.add(operation, Phase::Before, hook);
        self
    }

    pub fn after(
        mut self,
        operation: Operation,
        hook: impl Fn(&mut Resource<K>) + Send + Sync + 'static,
    ) -> Self {
        self.add(operation, Phase::After, hook);
        self
    }

    /// Appends a hook in place. Hooks run in registration order.
    pub fn add(
        &mut self,
        operation: Operation,
        phase: Phase,
        hook: impl Fn(&mut Resource<K>) + Send + Sync + 'static,
    ) {
        self.entries.push((operation, phase, Arc::new(hook)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The hooks registered for one point, cloned out so they can be called
    /// with a mutable borrow of the resource that owns this list.
    pub(crate) fn matching(&self, operation: Operation, phase: Phase) -> Vec<Hook<K>> {
        self.entries
            .iter()
            .filter(|(op, ph, _)| *op == operation && *ph == phase)
            .map(|(_, _, hook)| Arc::clone(hook))
            .collect()
    }
}

impl<K: ResourceKind> Default for Hooks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ResourceKind> Clone for Hooks<K> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K: ResourceKind> fmt::Debug for Hooks<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(op, ph, _)| (op, ph)))
            .finish()
    }
}
