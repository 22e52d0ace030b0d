//! Build pipeline model and the final bundling stage.
//!
//! Leaf to root: [`Resource`]s are the build artifacts, [`Task`]s the
//! units of work producing them, the [`BuildGraph`] the full set of tasks
//! in one pass, and [`BundleStage`] the join point that aggregates
//! everything into the shipped outputs.

pub mod bundle;
pub mod checksum;
pub mod custom_resources;
pub mod error;
pub mod fs;
pub mod graph;
pub mod properties;
pub mod resource;
pub mod task;

pub use bundle::{
    BundleStage, BundledOutput, StageState, ARCHIVE_EXT, DESCRIPTOR_BINARY_EXT, STAGE_NAME,
};
pub use custom_resources::{CustomResourcesBuilder, CUSTOM_RESOURCES_BUILDER};
pub use error::{Error, Result};
pub use graph::BuildGraph;
pub use properties::{BundleOptions, ProjectProperties};
pub use resource::{Resource, ResourceResolver};
pub use task::{BuilderId, Task};
