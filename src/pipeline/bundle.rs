//! The final bundling stage.
//!
//! This stage is the join point of a build pass: its creation phase
//! declares a task whose inputs are the descriptor plus every other task's
//! outputs, and its execution phase materializes the descriptor at its
//! canonical build location and, when enabled, packs all aggregated
//! content into a single disk archive.
//!
//! The external scheduler must run this stage strictly after every other
//! task in the pass; internally it is sequential.

use crate::archive::ArchiveWriter;
use crate::pipeline::checksum::calculate_sha256;
use crate::pipeline::custom_resources::CustomResourcesBuilder;
use crate::pipeline::error::{Context, Error, ErrorExt, Result};
use crate::pipeline::graph::BuildGraph;
use crate::pipeline::properties::{BundleOptions, ProjectProperties};
use crate::pipeline::resource::{Resource, ResourceResolver};
use crate::pipeline::task::{BuilderId, Task};
use std::io::Write;
use std::path::PathBuf;

/// Fixed identifier of the bundling stage.
pub const STAGE_NAME: &str = "project-bundler";

/// Extension of the materialized descriptor output.
pub const DESCRIPTOR_BINARY_EXT: &str = "projectc";

/// Extension of the disk archive output.
pub const ARCHIVE_EXT: &str = "darc";

/// Execution state of the stage.
///
/// `Created -> Executing -> Done | Failed`; no retries, a failed stage
/// fails the whole build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Task declared, inputs and outputs fixed.
    Created,
    /// Descriptor copy and, if enabled, archive assembly in progress.
    Executing,
    /// All declared outputs written.
    Done,
    /// An I/O or serialization error occurred; no partial output is valid.
    Failed,
}

/// Summary of one written output resource.
#[derive(Debug, Clone)]
pub struct BundledOutput {
    /// Absolute path of the output in the build directory.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Hex-encoded SHA-256 checksum of the content.
    pub checksum: String,
}

/// The final bundling stage of a build pass.
pub struct BundleStage {
    resolver: ResourceResolver,
    options: BundleOptions,
    state: StageState,
}

impl BundleStage {
    /// Creates the stage with options resolved at task-creation time.
    pub fn new(resolver: ResourceResolver, options: BundleOptions) -> Self {
        Self {
            resolver,
            options,
            state: StageState::Created,
        }
    }

    /// Returns the current execution state.
    pub fn state(&self) -> StageState {
        self.state
    }

    /// Returns the resolved bundle options.
    pub fn options(&self) -> BundleOptions {
        self.options
    }

    /// Creation phase: declares the stage task.
    ///
    /// Input 0 is the descriptor; output 0 is the descriptor binary and
    /// output 1, present only when `build_disk_archive` is set, the disk
    /// archive. Every output of every task already in the graph is
    /// appended to the input list in the graph's stable order, then the
    /// graph is frozen so nothing can slip past the snapshot.
    ///
    /// Before aggregating, the companion custom-resources builder runs
    /// over the project scope so resources outside the normal build graph
    /// are materialized and visible to the aggregation.
    ///
    /// # Errors
    ///
    /// Propagates custom-resource materialization failures as build-time
    /// errors naming the offending resource; task creation is aborted.
    pub async fn create(
        &mut self,
        descriptor: &Resource,
        properties: &ProjectProperties,
        graph: &mut BuildGraph,
    ) -> Result<Task> {
        CustomResourcesBuilder::run(&self.resolver, properties, graph).await?;

        let mut outputs = vec![descriptor.with_extension(DESCRIPTOR_BINARY_EXT)];
        if self.options.build_disk_archive {
            outputs.push(descriptor.with_extension(ARCHIVE_EXT));
        }

        let mut inputs = vec![descriptor.clone()];
        for task in graph.tasks_in_order() {
            inputs.extend(task.outputs().iter().cloned());
        }

        graph.freeze();
        self.state = StageState::Created;

        log::info!(
            "stage `{}`: aggregated {} input(s), declaring {} output(s)",
            STAGE_NAME,
            inputs.len(),
            outputs.len()
        );

        Task::new(STAGE_NAME, BuilderId::from(STAGE_NAME), inputs, outputs)
    }

    /// Execution phase: writes the declared outputs.
    ///
    /// Every aggregated input is verified to have a backing file before
    /// anything is written, so a vanished input fails the stage with no
    /// outputs created. Archive assembly (when enabled) runs first; the
    /// descriptor copy is unconditional and runs even when archive
    /// assembly failed partway, after which the archive error is reported.
    ///
    /// # Returns
    ///
    /// One [`BundledOutput`] summary per declared output, in output order.
    pub async fn build(&mut self, task: &Task) -> Result<Vec<BundledOutput>> {
        if task.name() != STAGE_NAME {
            crate::bail!("task `{}` was not declared by this stage", task.name());
        }

        self.transition(StageState::Executing);

        if let Err(e) = self.verify_inputs(task).await {
            self.transition(StageState::Failed);
            return Err(e);
        }

        let archive_result = if self.options.build_disk_archive {
            self.create_archive(task).await
        } else {
            Ok(())
        };

        let descriptor_result = self.copy_descriptor(task).await;

        if let Err(e) = archive_result.and(descriptor_result) {
            self.transition(StageState::Failed);
            return Err(e);
        }

        let mut outputs = Vec::with_capacity(task.outputs().len());
        for output in task.outputs() {
            let path = output.build_path();
            let metadata = tokio::fs::metadata(path)
                .await
                .fs_context("reading output metadata", path)?;
            outputs.push(BundledOutput {
                path: path.to_path_buf(),
                size: metadata.len(),
                checksum: calculate_sha256(path).await?,
            });
        }

        self.transition(StageState::Done);
        Ok(outputs)
    }

    /// Checks that every input has a backing file before any output is
    /// written.
    async fn verify_inputs(&self, task: &Task) -> Result<()> {
        for input in task.inputs() {
            if !input.exists().await {
                return Err(Error::ResourceIo {
                    action: "verifying input".to_string(),
                    path: input.build_path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "input resource has no backing file",
                    ),
                });
            }
        }
        Ok(())
    }

    /// Assembles the disk archive into output 1 via a private staging
    /// file. The staging file is discarded on every path out, success or
    /// failure.
    async fn create_archive(&self, task: &Task) -> Result<()> {
        let staging = tempfile::NamedTempFile::new()
            .map_err(|e| Error::GenericError(format!("creating staging file: {}", e)))?;

        let mut writer = ArchiveWriter::new(self.resolver.build_dir());
        for input in task.inputs().iter().skip(1) {
            // Input 0 is the descriptor itself; it ships raw as output 0
            // and must not appear inside the archive as well.
            writer.add(input.build_path(), self.options.compress_entries);
        }
        log::debug!("archiving {} entries", writer.entry_count());

        let (file, staging_path) = staging.into_parts();
        let flush_path = staging_path.to_path_buf();

        // Entry compression and serialization are blocking work.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut out = std::io::BufWriter::new(file);
            writer.write(&mut out)?;
            out.flush().map_err(|e| Error::ArchiveSerialization {
                path: flush_path,
                reason: format!("flushing staging file: {}", e),
            })
        })
        .await
        .map_err(|e| Error::GenericError(format!("archive task panicked: {}", e)))??;

        let content = tokio::fs::read(&staging_path)
            .await
            .fs_context("reading staging file", &staging_path)?;

        let archive_out = task
            .outputs()
            .get(1)
            .context("bundling task declares no archive output")?;
        archive_out.write(&content).await
    }

    /// Copies input 0's bytes verbatim to output 0. The content is
    /// produced upstream; this stage only relocates it.
    async fn copy_descriptor(&self, task: &Task) -> Result<()> {
        let descriptor = task
            .inputs()
            .first()
            .context("bundling task has no triggering input")?;
        let out = task
            .outputs()
            .first()
            .context("bundling task declares no descriptor output")?;
        let content = descriptor.read().await?;
        out.write(&content).await
    }

    fn transition(&mut self, next: StageState) {
        log::debug!("stage `{}`: {:?} -> {:?}", STAGE_NAME, self.state, next);
        self.state = next;
    }
}
