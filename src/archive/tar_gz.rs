use crate::runtime::Runtime;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::path::{Path, PathBuf};
use tar::{Archive, EntryType};

use super::{ArchiveExtractor, is_safe_entry_path, record_top_level};

/// Extractor for .tar.gz / .tgz archives
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    #[tracing::instrument(skip(self, runtime, archive_path, extract_to))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<Vec<PathBuf>> {
        debug!("Extracting tar.gz archive to {:?}...", extract_to);

        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);

        let mut top_level = Vec::new();

        for entry in archive
            .entries()
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?
        {
            let mut entry = entry.context("Failed to read archive entry")?;
            let entry_path = entry.path().context("Invalid entry path in archive")?;

            if !is_safe_entry_path(&entry_path) {
                debug!("Skipping unsafe entry path {:?}", entry_path);
                continue;
            }

            record_top_level(&mut top_level, &entry_path);
            let dest = extract_to.join(&entry_path);

            match entry.header().entry_type() {
                EntryType::Directory => {
                    runtime
                        .create_dir_all(&dest)
                        .with_context(|| format!("Failed to create directory {:?}", dest))?;
                }
                EntryType::Regular => {
                    if let Some(parent) = dest.parent() {
                        runtime.create_dir_all(parent)?;
                    }
                    let mut writer = runtime
                        .create_file(&dest)
                        .with_context(|| format!("Failed to create file {:?}", dest))?;
                    std::io::copy(&mut entry, &mut writer)
                        .with_context(|| format!("Failed to extract {:?}", dest))?;

                    if let Ok(mode) = entry.header().mode() {
                        runtime.set_permissions(&dest, mode)?;
                    }
                }
                // Symlinks and other entry types are rare in CMake archives;
                // they are skipped rather than partially handled.
                other => {
                    debug!("Skipping entry {:?} of type {:?}", entry_path, other);
                }
            }
        }

        Ok(top_level)
    }
}
