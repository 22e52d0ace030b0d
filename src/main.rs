//! Project Bundler - final bundling stage for resource build pipelines.
//!
//! This binary runs one bundling pass over a project: it copies custom
//! resources into the build output, materializes the project descriptor,
//! and optionally packs every built resource into a single disk archive.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match project_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
