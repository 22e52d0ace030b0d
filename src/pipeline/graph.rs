//! The build graph: every task produced by every builder in one pass.
//!
//! The graph is append-only while builders register their tasks, then
//! frozen before the bundling stage executes. Iteration order is stable
//! across runs: builders in first-registration order, then each builder's
//! tasks in registration order. Archive entry ordering depends on it.

use crate::pipeline::error::{Error, Result};
use crate::pipeline::task::{BuilderId, Task};
use std::collections::HashMap;

/// Ordered registry of all tasks in a build pass.
#[derive(Debug, Default)]
pub struct BuildGraph {
    /// Builder identities in first-registration order.
    order: Vec<BuilderId>,

    /// Tasks per builder, in registration order.
    tasks: HashMap<BuilderId, Vec<Task>>,

    frozen: bool,
}

impl BuildGraph {
    /// Creates an empty, open graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a task under its owning builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphFrozen`] once the snapshot has been frozen;
    /// registration after the bundling stage has aggregated its inputs
    /// would silently escape the archive.
    pub fn register(&mut self, task: Task) -> Result<()> {
        if self.frozen {
            return Err(Error::GraphFrozen {
                task: task.name().to_string(),
            });
        }
        let owner = task.owner().clone();
        if !self.tasks.contains_key(&owner) {
            self.order.push(owner.clone());
        }
        self.tasks.entry(owner).or_default().push(task);
        Ok(())
    }

    /// Freezes the graph; further registration is an error.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns true once the snapshot has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Iterates all tasks in the stable aggregation order.
    pub fn tasks_in_order(&self) -> impl Iterator<Item = &Task> {
        self.order
            .iter()
            .filter_map(|owner| self.tasks.get(owner))
            .flatten()
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    /// Returns true when no task has been registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
