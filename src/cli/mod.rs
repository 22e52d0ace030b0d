//! Command line interface for the project bundler.
//!
//! Thin dispatch over the pipeline: `bundle` runs one pass and prints a
//! summary per written output, `inspect` lists the entries of an archive.

mod args;

pub use args::{Args, Command};

use crate::archive::ArchiveReader;
use crate::error::{CliError, Result};
use crate::pipeline::{
    BuildGraph, BundleOptions, BundleStage, ProjectProperties, ResourceResolver,
};
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    if let Err(reason) = args.validate() {
        return Err(CliError::InvalidArguments { reason }.into());
    }

    match args.command {
        Command::Bundle { project, build_dir } => bundle(&project, &build_dir).await,
        Command::Inspect { archive } => inspect(&archive),
    }
}

/// Runs one bundling pass over the given project descriptor.
async fn bundle(project: &Path, build_dir: &Path) -> Result<i32> {
    let descriptor_name = project
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidArguments {
            reason: format!("not a descriptor path: {}", project.display()),
        })?
        .to_string();
    let project_root = match project.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let resolver = ResourceResolver::new(&project_root, build_dir);
    let descriptor = resolver.resolve(&descriptor_name);
    let properties = ProjectProperties::load(&descriptor).await?;
    let options = BundleOptions::from_properties(&properties);

    let mut graph = BuildGraph::new();
    let mut stage = BundleStage::new(resolver, options);
    let task = stage.create(&descriptor, &properties, &mut graph).await?;
    let outputs = stage.build(&task).await?;

    for output in &outputs {
        println!(
            "{}  {} bytes  sha256:{}",
            output.path.display(),
            output.size,
            output.checksum
        );
    }
    Ok(0)
}

/// Prints the index of a disk archive.
fn inspect(archive: &Path) -> Result<i32> {
    let reader = ArchiveReader::open(archive)?;
    println!("{}: {} entries", archive.display(), reader.entries().len());
    for entry in reader.entries() {
        println!(
            "  {}  {}  {} -> {} bytes",
            entry.path,
            if entry.compressed { "deflate" } else { "stored " },
            entry.original_size,
            entry.stored_size
        );
    }
    Ok(0)
}
