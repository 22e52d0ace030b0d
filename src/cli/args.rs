//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Final bundling stage for resource build pipelines
#[derive(Parser, Debug)]
#[command(
    name = "project-bundler",
    version,
    about = "Final bundling stage for resource build pipelines",
    long_about = "Runs the final bundling stage of a content build pass: copies custom \
resources into the build output, materializes the project descriptor, and optionally \
packs every built resource into a single disk archive.

Usage:
  project-bundler bundle --project game.project
  project-bundler bundle --project demo/game.project --build-dir out
  project-bundler inspect build/game.darc

Exit code 0 = every declared output exists in the build directory."
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Bundler subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one bundling pass over a project
    Bundle {
        /// Path to the project descriptor (e.g. game.project)
        #[arg(short, long, value_name = "DESCRIPTOR")]
        project: PathBuf,

        /// Build output directory, relative to the project root unless absolute
        #[arg(short, long, value_name = "DIR", default_value = "build")]
        build_dir: PathBuf,
    },

    /// List the entries of a disk archive
    Inspect {
        /// Path to a disk archive produced by `bundle`
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Bundle { project, .. } => {
                if project.file_name().is_none() {
                    return Err(format!(
                        "Not a descriptor path: {}",
                        project.display()
                    ));
                }
                Ok(())
            }
            Command::Inspect { .. } => Ok(()),
        }
    }
}
