//! Immutable build task values.

use crate::pipeline::error::{Error, Result};
use crate::pipeline::resource::Resource;
use std::fmt;

/// Identity of the builder that produced a task.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct BuilderId(String);

impl BuilderId {
    /// Creates a builder identity from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the builder name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuilderId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// One named unit of work with ordered inputs and outputs.
///
/// A task is an immutable value: both lists are fixed at creation and never
/// mutated during execution. Input 0 is the triggering resource of the task
/// that declared it.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    owner: BuilderId,
    inputs: Vec<Resource>,
    outputs: Vec<Resource>,
}

impl Task {
    /// Creates a task from fully computed input and output lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTask`] when the input list is empty; every
    /// task carries at least its triggering resource as input 0.
    pub fn new(
        name: impl Into<String>,
        owner: BuilderId,
        inputs: Vec<Resource>,
        outputs: Vec<Resource>,
    ) -> Result<Self> {
        let name = name.into();
        if inputs.is_empty() {
            return Err(Error::InvalidTask {
                task: name,
                reason: "input list is empty".to_string(),
            });
        }
        Ok(Self {
            name,
            owner,
            inputs,
            outputs,
        })
    }

    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identity of the owning builder.
    pub fn owner(&self) -> &BuilderId {
        &self.owner
    }

    /// Returns the ordered input resources.
    pub fn inputs(&self) -> &[Resource] {
        &self.inputs
    }

    /// Returns the ordered output resources.
    pub fn outputs(&self) -> &[Resource] {
        &self.outputs
    }
}
