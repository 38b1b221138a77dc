//! The CMake code model exported by the CMake integration.
//!
//! A tree of configurations, projects and targets. Names are unique within
//! their immediate parent's child list only. The tree is read-only here:
//! nothing in this crate ever mutates it.

mod source;

pub use source::{CodeModelSource, FileModelSource, ModelEvent, ModelState};

#[cfg(test)]
pub use source::MockCodeModelSource;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CodeModel {
    #[serde(default)]
    pub configurations: Vec<Configuration>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
}
