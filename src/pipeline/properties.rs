//! Project descriptor properties and the typed bundle options.
//!
//! The descriptor is a TOML file with flat string-valued keys. Option
//! lookup follows a lenient convention: boolean options are the strings
//! `"true"`/`"false"`, any other value (or an absent key) reads as false
//! and never raises an error.

use crate::pipeline::error::{Error, Result};
use crate::pipeline::resource::Resource;

/// Option key gating creation and writing of the disk archive output.
pub const OPT_BUILD_DISK_ARCHIVE: &str = "build_disk_archive";

/// Option key gating the per-entry compression attempt.
pub const OPT_COMPRESS_ENTRIES: &str = "compress_disk_archive_entries";

/// Property key listing resources to copy outside the normal build graph.
pub const PROP_CUSTOM_RESOURCES: &str = "custom_resources";

/// Key/value lookup over a parsed project descriptor.
#[derive(Debug, Clone, Default)]
pub struct ProjectProperties {
    table: toml::Table,
}

impl ProjectProperties {
    /// Parses properties from descriptor content.
    ///
    /// # Errors
    ///
    /// Returns an error when the content is not valid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table = toml::from_str::<toml::Table>(content)
            .map_err(|e| Error::GenericError(format!("invalid project descriptor: {}", e)))?;
        Ok(Self { table })
    }

    /// Loads and parses the properties of a descriptor resource.
    pub async fn load(descriptor: &Resource) -> Result<Self> {
        let content = descriptor.read().await?;
        let content = String::from_utf8(content).map_err(|_| {
            Error::GenericError(format!(
                "project descriptor `{}` is not valid UTF-8",
                descriptor.logical_path()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Looks up a string option, falling back to the given default.
    pub fn option<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.table.get(key) {
            Some(toml::Value::String(s)) => s.as_str(),
            _ => default,
        }
    }

    /// Looks up a boolean option under the lenient string convention:
    /// exactly `"true"` enables it, everything else reads as false.
    pub fn bool_option(&self, key: &str) -> bool {
        self.option(key, "false") == "true"
    }

    /// Looks up a list of strings, absent keys yielding an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.table.get(key) {
            Some(toml::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Typed bundling options, resolved once at task-creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleOptions {
    /// Whether the stage declares and writes the disk archive output.
    pub build_disk_archive: bool,

    /// Per-entry compress hint handed to the archive writer.
    pub compress_entries: bool,
}

impl BundleOptions {
    /// Resolves the options from project properties.
    pub fn from_properties(properties: &ProjectProperties) -> Self {
        Self {
            build_disk_archive: properties.bool_option(OPT_BUILD_DISK_ARCHIVE),
            compress_entries: properties.bool_option(OPT_COMPRESS_ENTRIES),
        }
    }
}
