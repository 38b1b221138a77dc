//! Download-and-install flow for CMake release archives.
//!
//! Candidates are probed in order; a missing remote archive is a recoverable
//! per-candidate miss, while an error in an in-flight download aborts the
//! whole install. The two must never be merged: probing is cheap and has no
//! side effects, an aborted transfer does not justify silently installing a
//! less specific binary.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::archive::ArchiveExtractor;
use crate::http::HttpClient;
use crate::notify::Notifier;
use crate::release::ReleaseVersion;
use crate::runtime::Runtime;

/// Minimum interval between progress notifications.
const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// Install failures callers are expected to match on.
#[derive(Debug)]
pub enum InstallError {
    /// Every candidate was probed and none exists remotely.
    NoCompatibleRelease { version: String },
    /// An in-flight download failed; not a fallback trigger.
    DownloadFailed(String),
    /// The downloaded archive could not be extracted.
    ExtractionFailed(String),
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallError::NoCompatibleRelease { version } => {
                write!(
                    f,
                    "No compatible CMake {} release archive exists for this platform",
                    version
                )
            }
            InstallError::DownloadFailed(msg) => write!(f, "Download failed: {}", msg),
            InstallError::ExtractionFailed(msg) => write!(f, "Extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for InstallError {}

/// Probes `candidates` in order against the release file index, downloads
/// the first archive that exists into `dest_dir`, extracts it and removes
/// the archive file. Returns the path of the extracted release directory.
///
/// No filesystem writes happen before a candidate is confirmed to exist.
#[tracing::instrument(skip(runtime, http, extractor, notifier, dest_dir))]
pub async fn install_release<R, E, N>(
    runtime: &R,
    http: &HttpClient,
    extractor: &E,
    notifier: &N,
    version: &ReleaseVersion,
    candidates: &[&str],
    extension: &str,
    files_base: &str,
    dest_dir: &Path,
) -> Result<PathBuf>
where
    R: Runtime + 'static,
    E: ArchiveExtractor,
    N: Notifier,
{
    let chosen = match probe_candidates(http, notifier, version, candidates, extension, files_base)
        .await
    {
        Some(candidate) => candidate,
        None => {
            return Err(InstallError::NoCompatibleRelease {
                version: version.to_string(),
            }
            .into());
        }
    };

    let archive_name = version.archive_file_name(chosen, extension);
    let archive_url = version.archive_url(files_base, chosen, extension);

    runtime
        .create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create download directory {:?}", dest_dir))?;
    let archive_path = dest_dir.join(&archive_name);

    info!("Downloading {}...", archive_url);
    if let Err(e) = download_archive(runtime, http, notifier, &archive_url, &archive_path).await {
        remove_archive(runtime, &archive_path);
        return Err(InstallError::DownloadFailed(format!("{:#}", e)).into());
    }

    debug!("Extracting {:?}...", archive_path);
    let top_level = match extractor.extract(runtime, &archive_path, dest_dir) {
        Ok(entries) => entries,
        Err(e) => {
            remove_archive(runtime, &archive_path);
            return Err(InstallError::ExtractionFailed(format!("{:#}", e)).into());
        }
    };

    remove_archive(runtime, &archive_path);

    // The installed path is the first top-level directory the extraction produced.
    let installed = top_level
        .iter()
        .map(|entry| dest_dir.join(entry))
        .find(|path| runtime.is_dir(path))
        .ok_or_else(|| {
            anyhow::Error::from(InstallError::ExtractionFailed(
                "Archive contained no top-level directory".to_string(),
            ))
        })?;

    notifier.info(&format!(
        "CMake {} installed in {}",
        version,
        installed.display()
    ));
    Ok(installed)
}

/// Sequential existence probing over an immutable candidate list.
/// One in-flight request at a time; order is never changed.
async fn probe_candidates<'a, N: Notifier>(
    http: &HttpClient,
    notifier: &N,
    version: &ReleaseVersion,
    candidates: &'a [&'a str],
    extension: &str,
    files_base: &str,
) -> Option<&'a str> {
    for &candidate in candidates {
        let url = version.archive_url(files_base, candidate, extension);
        if http.exists(&url).await {
            debug!("Found release archive at {}", url);
            return Some(candidate);
        }
        notifier.info(&format!(
            "{} is not available, trying the next candidate...",
            version.archive_file_name(candidate, extension)
        ));
    }
    None
}

async fn download_archive<R: Runtime, N: Notifier>(
    runtime: &R,
    http: &HttpClient,
    notifier: &N,
    url: &str,
    archive_path: &Path,
) -> Result<()> {
    let mut writer = runtime
        .create_file(archive_path)
        .with_context(|| format!("Failed to create archive file {:?}", archive_path))?;

    let started = Instant::now();
    let mut last_tick = Instant::now() - PROGRESS_TICK;

    http.download(url, &mut writer, |downloaded, total| {
        if last_tick.elapsed() < PROGRESS_TICK {
            return;
        }
        last_tick = Instant::now();

        let percent = total
            .filter(|t| *t > 0)
            .map(|t| ((downloaded * 100) / t).min(100) as u8);
        let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
        notifier.progress(percent, downloaded as f64 / elapsed);
    })
    .await?;

    Ok(())
}

fn remove_archive<R: Runtime>(runtime: &R, archive_path: &Path) {
    if !runtime.exists(archive_path) {
        return;
    }
    if let Err(e) = runtime.remove_file(archive_path) {
        warn!("Failed to remove archive {:?}: {}", archive_path, e);
    }
}
