//! The `install` command: pick a version, resolve the platform, download
//! and extract the release, then offer to point `cmake_path` at it.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::archive::ArchiveExtractor;
use crate::http::HttpClient;
use crate::installer::install_release;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::platform;
use crate::release::{ListTags, ReleaseVersion, sorted_descending};
use crate::runtime::Runtime;
use crate::settings::{Settings, default_settings_path};

use super::Config;

/// Entry point used by the CLI: wires the real collaborators.
pub async fn install<R: Runtime + 'static>(
    runtime: &R,
    version: Option<String>,
    assume_yes: bool,
    settings_file: Option<PathBuf>,
    files_url: Option<String>,
    api_url: Option<String>,
) -> Result<()> {
    let config = Config::new(files_url, api_url)?;
    install_with(
        runtime,
        &config.http,
        &config.tags,
        &config.extractor,
        &ConsoleNotifier,
        &config.files_url,
        version,
        assume_yes,
        settings_file,
    )
    .await
}

/// Install flow with every collaborator injected, for tests.
#[allow(clippy::too_many_arguments)]
pub async fn install_with<R, T, E, N>(
    runtime: &R,
    http: &HttpClient,
    tags: &T,
    extractor: &E,
    notifier: &N,
    files_url: &str,
    version: Option<String>,
    assume_yes: bool,
    settings_file: Option<PathBuf>,
) -> Result<()>
where
    R: Runtime + 'static,
    T: ListTags,
    E: ArchiveExtractor,
    N: Notifier,
{
    let Some(version) = pick_version(runtime, tags, version).await? else {
        info!("No version selected, nothing to do");
        return Ok(());
    };

    let platform = match platform::detect() {
        Ok(platform) => platform,
        Err(e) => {
            notifier.error(&e.to_string());
            return Err(e.into());
        }
    };
    debug!(
        "Resolved platform candidates: {:?}",
        platform.candidates()
    );

    let settings_path = match settings_file {
        Some(path) => path,
        None => default_settings_path(runtime)?,
    };
    let mut settings = Settings::load(runtime, &settings_path)?;
    let dest_dir = settings.download_path_or_default(runtime, &settings_path)?;

    let installed = match install_release(
        runtime,
        http,
        extractor,
        notifier,
        &version,
        platform.candidates(),
        platform.archive_extension(),
        files_url,
        &dest_dir,
    )
    .await
    {
        Ok(path) => path,
        Err(e) => {
            notifier.error(&format!("Failed to install CMake {}: {:#}", version, e));
            return Err(e);
        }
    };

    let cmake_bin = cmake_binary_path(&installed);
    let update = assume_yes
        || runtime.confirm(&format!(
            "Set cmake_path to \"{}\"?",
            cmake_bin.display()
        ))?;

    if update {
        settings.cmake_path = Some(cmake_bin.clone());
        settings.save(runtime, &settings_path)?;
        notifier.info(&format!("cmake_path set to {}", cmake_bin.display()));
    } else {
        debug!("Keeping the existing cmake_path");
    }

    Ok(())
}

async fn pick_version<R: Runtime, T: ListTags>(
    runtime: &R,
    tags: &T,
    requested: Option<String>,
) -> Result<Option<ReleaseVersion>> {
    if let Some(requested) = requested {
        return requested.parse().map(Some);
    }

    let remote = tags.list_tags().await.context("Failed to list CMake versions")?;
    let remote = sorted_descending(remote);
    let picked = runtime.select("Choose a CMake version to download and install", &remote)?;

    match picked {
        Some(index) => remote[index].parse().map(Some),
        None => Ok(None),
    }
}

fn cmake_binary_path(installed: &Path) -> PathBuf {
    let binary = if cfg!(windows) { "cmake.exe" } else { "cmake" };
    installed.join("bin").join(binary)
}
