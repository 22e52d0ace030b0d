//! Pipeline error types.
//!
//! Errors raised while declaring or executing the bundling stage. Fatal by
//! design: a failed stage fails the whole build pass, no retries.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the bundling pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Reading an input or writing an output resource failed
    #[error("resource I/O error while {action} `{}`: {source}", path.display())]
    ResourceIo {
        /// What the pipeline was doing when the error occurred
        action: String,
        /// Path of the offending resource
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The archive writer failed while serializing entries
    #[error("archive serialization failed for `{}`: {reason}", path.display())]
    ArchiveSerialization {
        /// Entry or archive path involved in the failure
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// A task was registered after the graph snapshot was frozen
    #[error("build graph is frozen, cannot register task `{task}`")]
    GraphFrozen {
        /// Name of the rejected task
        task: String,
    },

    /// A task value violated a construction invariant
    #[error("invalid task `{task}`: {reason}")]
    InvalidTask {
        /// Name of the task
        task: String,
        /// Violated invariant
        reason: String,
    },

    /// Directory traversal errors
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Generic errors
    #[error("{0}")]
    GenericError(String),
}

/// Bails out of the current function with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::pipeline::Error::GenericError(format!($($arg)*)).into())
    };
}

/// Extension trait attaching resource context to I/O results.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::ResourceIo`] naming the action
    /// and the resource path involved.
    fn fs_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::ResourceIo {
            action: action.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Extension trait turning empty options into pipeline errors.
pub trait Context<T> {
    /// Unwraps the option or fails with a [`Error::GenericError`].
    fn context(self, msg: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}
