//! Companion builder copying custom resources into the build output.
//!
//! Custom resources are files the project ships verbatim without any
//! content builder claiming them. They live outside the normal build graph
//! until this builder materializes them and registers one task per entry,
//! which makes them visible to the bundling stage's aggregation step.

use crate::pipeline::error::{Error, Result};
use crate::pipeline::graph::BuildGraph;
use crate::pipeline::properties::{ProjectProperties, PROP_CUSTOM_RESOURCES};
use crate::pipeline::resource::ResourceResolver;
use crate::pipeline::task::{BuilderId, Task};
use crate::pipeline::fs;

/// Fixed identifier of the custom resources builder.
pub const CUSTOM_RESOURCES_BUILDER: &str = "copy-custom-resources";

/// Builder that copies `custom_resources` entries and registers their tasks.
pub struct CustomResourcesBuilder;

impl CustomResourcesBuilder {
    /// Copies every custom resource into the build output directory and
    /// registers a task per entry.
    ///
    /// Directory entries are copied recursively; the registered task lists
    /// each contained file as a separate output, in a stable lexicographic
    /// order, so every file becomes its own archive entry downstream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceIo`] naming the offending resource when an
    /// entry has no backing file or a copy fails. The caller treats this as
    /// a build-time error and aborts task creation.
    pub async fn run(
        resolver: &ResourceResolver,
        properties: &ProjectProperties,
        graph: &mut BuildGraph,
    ) -> Result<()> {
        let owner = BuilderId::new(CUSTOM_RESOURCES_BUILDER);

        for logical in properties.string_list(PROP_CUSTOM_RESOURCES) {
            let resource = resolver.resolve(&logical);
            let source = resource.source_path();

            let outputs = if source.is_dir() {
                fs::copy_dir(source, resource.build_path()).await?;
                fs::list_files(source)?
                    .into_iter()
                    .map(|rel| {
                        let rel = rel.to_string_lossy().replace('\\', "/");
                        let logical = format!("{}/{}", logical.trim_end_matches('/'), rel);
                        resolver.resolve(&logical)
                    })
                    .collect()
            } else if source.is_file() {
                fs::copy_file(source, resource.build_path()).await?;
                vec![resource.clone()]
            } else {
                return Err(Error::ResourceIo {
                    action: "materializing custom resource".to_string(),
                    path: source.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such resource"),
                });
            };

            log::debug!(
                "custom resource `{}` materialized ({} output(s))",
                logical,
                outputs.len()
            );

            let task = Task::new(
                CUSTOM_RESOURCES_BUILDER,
                owner.clone(),
                vec![resource],
                outputs,
            )?;
            graph.register(task)?;
        }

        Ok(())
    }
}
