//! Persisted cmth settings.
//!
//! A small JSON file with two recognized options: where CMake downloads are
//! installed (`cmake_download_path`) and which cmake binary the workspace
//! should use (`cmake_path`). Unknown keys are preserved across rewrites.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Directory under the home directory holding settings and downloads.
pub const DEFAULT_ROOT_DIR: &str = ".cmth";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_download_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_path: Option<PathBuf>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    /// Loads settings from `path`; a missing file yields defaults.
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            debug!("Settings file {:?} does not exist, using defaults", path);
            return Ok(Settings::default());
        }
        let raw = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse settings {:?}", path))
    }

    #[tracing::instrument(skip(self, runtime, path))]
    pub fn save<R: Runtime>(&self, runtime: &R, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            runtime.create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        runtime
            .write(path, raw.as_bytes())
            .with_context(|| format!("Failed to write settings to {:?}", path))
    }

    /// The configured download path, or the default under the home directory.
    /// When defaulting, the value is persisted back so later runs (and the
    /// user) see where downloads go.
    #[tracing::instrument(skip(self, runtime, path))]
    pub fn download_path_or_default<R: Runtime>(
        &mut self,
        runtime: &R,
        path: &Path,
    ) -> Result<PathBuf> {
        if let Some(configured) = &self.cmake_download_path {
            return Ok(configured.clone());
        }

        let home = runtime
            .home_dir()
            .context("Cannot determine the home directory for the default download path")?;
        let default = home.join(DEFAULT_ROOT_DIR).join("cmake_dl");
        runtime
            .create_dir_all(&default)
            .with_context(|| format!("Failed to create download directory {:?}", default))?;

        self.cmake_download_path = Some(default.clone());
        self.save(runtime, path)?;
        debug!("cmake_download_path defaulted to {:?}", default);
        Ok(default)
    }
}

/// Default settings file location (`~/.cmth/settings.json`).
pub fn default_settings_path<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime
        .home_dir()
        .context("Cannot determine the home directory")?;
    Ok(home.join(DEFAULT_ROOT_DIR).join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&RealRuntime, &dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            cmake_download_path: Some(PathBuf::from("/opt/cmake_dl")),
            cmake_path: Some(PathBuf::from("/opt/cmake_dl/cmake-3.18.4/bin/cmake")),
            rest: serde_json::Map::new(),
        };
        settings.save(&RealRuntime, &path).unwrap();

        let loaded = Settings::load(&RealRuntime, &path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"cmake_path": "/usr/bin/cmake", "experimental": true}"#).unwrap();

        let loaded = Settings::load(&RealRuntime, &path).unwrap();
        loaded.save(&RealRuntime, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["experimental"], serde_json::json!(true));
    }

    #[test]
    fn test_download_path_prefers_configured_value() {
        let mut settings = Settings {
            cmake_download_path: Some(PathBuf::from("/configured")),
            ..Default::default()
        };
        // No runtime calls expected beyond none: strict mock
        let runtime = MockRuntime::new();
        let path = Path::new("/ignored/settings.json");

        let result = settings.download_path_or_default(&runtime, path).unwrap();
        assert_eq!(result, PathBuf::from("/configured"));
    }

    #[test]
    fn test_download_path_defaults_under_home_and_persists() {
        let dir = tempdir().unwrap();
        let home = dir.path().to_path_buf();
        let settings_path = home.join(DEFAULT_ROOT_DIR).join("settings.json");

        let mut runtime = MockRuntime::new();
        {
            let home = home.clone();
            runtime.expect_home_dir().returning(move || Some(home.clone()));
        }
        runtime
            .expect_create_dir_all()
            .returning(|p| std::fs::create_dir_all(p).map_err(Into::into));
        runtime
            .expect_write()
            .with(eq(settings_path.clone()), mockall::predicate::always())
            .returning(|p, c| std::fs::write(p, c).map_err(Into::into));

        let mut settings = Settings::default();
        let result = settings
            .download_path_or_default(&runtime, &settings_path)
            .unwrap();

        assert_eq!(result, home.join(DEFAULT_ROOT_DIR).join("cmake_dl"));
        assert_eq!(settings.cmake_download_path, Some(result));
    }
}
