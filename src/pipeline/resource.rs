//! Build resources and the resolver that creates them.
//!
//! A [`Resource`] is a handle to one build artifact, identified by its
//! logical project-relative path. Every resource is dual-rooted: the source
//! tree holds the pristine file, the build output directory holds whatever
//! a task wrote for it. Reads prefer the build copy so a later stage sees
//! prior task outputs; writes always target the build copy.

use crate::pipeline::error::{ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Handle to a single build artifact.
///
/// Two resources with the same logical path refer to the same artifact.
/// Resources are created by a [`ResourceResolver`] before any task runs and
/// are mutated only by the task that declares them as an output.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Project-relative path, `/`-separated (e.g. `data/game.project`).
    logical: String,

    /// Absolute path of the pristine file in the source tree.
    source_path: PathBuf,

    /// Absolute path of the built file in the build output directory.
    build_path: PathBuf,
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.logical == other.logical
    }
}

impl Eq for Resource {}

impl Resource {
    /// Returns the logical project-relative path.
    pub fn logical_path(&self) -> &str {
        &self.logical
    }

    /// Returns the absolute path of the pristine source file.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns the absolute path of the build output copy.
    ///
    /// This is where `write` places content and where archive entries are
    /// picked up from.
    pub fn build_path(&self) -> &Path {
        &self.build_path
    }

    /// Derives a sibling resource by substituting the file extension.
    ///
    /// `game.project` with extension `projectc` becomes `game.projectc`,
    /// in the same directory on both roots.
    pub fn with_extension(&self, ext: &str) -> Resource {
        Resource {
            logical: PathBuf::from(&self.logical)
                .with_extension(ext)
                .to_string_lossy()
                .into_owned(),
            source_path: self.source_path.with_extension(ext),
            build_path: self.build_path.with_extension(ext),
        }
    }

    /// Returns true if a backing file exists on either root.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.build_path).await.unwrap_or(false)
            || fs::try_exists(&self.source_path).await.unwrap_or(false)
    }

    /// Reads the full content of the resource.
    ///
    /// The build output copy wins over the pristine source, so prior task
    /// outputs are observed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceIo`](crate::pipeline::Error::ResourceIo)
    /// when no backing file exists or the read fails.
    pub async fn read(&self) -> Result<Vec<u8>> {
        if fs::try_exists(&self.build_path).await.unwrap_or(false) {
            return fs::read(&self.build_path)
                .await
                .fs_context("reading", &self.build_path);
        }
        fs::read(&self.source_path)
            .await
            .fs_context("reading", &self.source_path)
    }

    /// Writes the full content of the resource to its build output copy.
    ///
    /// Parent directories are created as needed. Content is written in one
    /// operation; no partial write is exposed externally.
    pub async fn write(&self, content: &[u8]) -> Result<()> {
        if let Some(parent) = self.build_path.parent() {
            fs::create_dir_all(parent)
                .await
                .fs_context("creating output directory for", &self.build_path)?;
        }
        fs::write(&self.build_path, content)
            .await
            .fs_context("writing", &self.build_path)
    }
}

/// Creates [`Resource`]s from logical paths.
///
/// Rooted at a project directory and a build output directory; every
/// resolved resource maps its logical path under both.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    project_root: PathBuf,
    build_dir: PathBuf,
}

impl ResourceResolver {
    /// Creates a resolver for the given project root and build directory.
    ///
    /// A relative `build_dir` is taken relative to the project root.
    pub fn new<P: AsRef<Path>, B: AsRef<Path>>(project_root: P, build_dir: B) -> Self {
        let project_root = project_root.as_ref().to_path_buf();
        let build_dir = if build_dir.as_ref().is_absolute() {
            build_dir.as_ref().to_path_buf()
        } else {
            project_root.join(build_dir.as_ref())
        };
        Self {
            project_root,
            build_dir,
        }
    }

    /// Resolves a logical path to a [`Resource`].
    pub fn resolve(&self, logical: &str) -> Resource {
        let relative = logical.trim_start_matches('/');
        Resource {
            logical: relative.to_string(),
            source_path: self.project_root.join(relative),
            build_path: self.build_dir.join(relative),
        }
    }

    /// Returns the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the build output directory all archive entry paths are
    /// resolved against.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}
