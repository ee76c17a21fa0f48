//! Local annotator module registry
//!
//! Installed annotator modules live under one directory, one subdirectory
//! per module with a `<name>/<name>.yml` manifest (the OpenCRAVAT store
//! layout). Lookups here never touch the network.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use oc_core::{Error, Result};

/// Parsed module manifest; only the fields the tools report
#[derive(Debug, Deserialize)]
struct ModuleManifest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Read-only view over the installed annotator modules
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    root: PathBuf,
}

impl ModuleRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the registry root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List installed annotator names, sorted.
    ///
    /// A missing or empty modules directory yields an empty list, not an
    /// error, so a bare server still serves the annotate tools.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.manifest_path(&name).is_file() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Get an installed annotator's description text.
    pub fn describe(&self, name: &str) -> Result<String> {
        // Module names are plain directory names; reject separators instead
        // of letting a crafted name escape the registry root.
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(Error::tool(
                "describe_annotator",
                format!("invalid annotator name: {:?}", name),
            ));
        }

        let path = self.manifest_path(name);
        let raw = std::fs::read_to_string(&path).map_err(|_| {
            Error::tool(
                "describe_annotator",
                format!("annotator '{}' is not installed", name),
            )
        })?;

        let manifest: ModuleManifest = serde_yaml::from_str(&raw).map_err(|e| {
            Error::tool(
                "describe_annotator",
                format!("invalid manifest for '{}': {}", name, e),
            )
        })?;

        match (manifest.description, manifest.title) {
            (Some(description), _) => Ok(description),
            (None, Some(title)) => Ok(title),
            (None, None) => Ok(format!("{} (no description available)", name)),
        }
    }

    fn manifest_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(format!("{}.yml", name))
    }
}
