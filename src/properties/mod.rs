//! The C/C++ tooling plugin's `c_cpp_properties.json`.
//!
//! The file is owned by that plugin: only the order of its `configurations`
//! array is ours to change. Every field except `configurations[].name` is
//! opaque and must round-trip byte-for-byte equivalent JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::projector::reorder_active_first;
use crate::runtime::Runtime;

/// One entry of the `configurations` array. `name` is the only field this
/// crate interprets; everything else is carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CppConfigEntry {
    pub name: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CppProperties {
    pub configurations: Vec<CppConfigEntry>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl CppProperties {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let raw = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {:?}", path))
    }

    #[tracing::instrument(skip(self, runtime, path))]
    pub fn save<R: Runtime>(&self, runtime: &R, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            runtime.create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize properties")?;
        runtime
            .write(path, raw.as_bytes())
            .with_context(|| format!("Failed to write {:?}", path))
    }

    /// Moves the configuration entry matching `active_label` to index 0.
    /// Unmatched labels leave the array untouched.
    pub fn activate(&mut self, active_label: &str) {
        let entries = std::mem::take(&mut self.configurations);
        self.configurations = reorder_active_first(entries, active_label, |e| &e.name);
    }
}
