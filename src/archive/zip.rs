use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use super::{ArchiveExtractor, is_safe_entry_path, record_top_level};

/// Extractor for .zip archives
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".zip")
    }

    #[tracing::instrument(skip(self, runtime, archive_path, extract_to))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<Vec<PathBuf>> {
        debug!("Extracting zip archive to {:?}...", extract_to);

        let mut reader = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

        // zip requires Read + Seek, but Runtime::open returns Box<dyn Read + Send>,
        // so buffer the whole archive in memory for seeking.
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
        let cursor = std::io::Cursor::new(buffer);

        let mut archive = ZipArchive::new(cursor).context("Failed to parse ZIP archive")?;

        let mut top_level = Vec::new();

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .context("Failed to read ZIP archive entry")?;

            let Some(entry_path) = file.enclosed_name() else {
                debug!("Skipping unsafe entry name {:?}", file.name());
                continue;
            };
            if !is_safe_entry_path(&entry_path) {
                debug!("Skipping unsafe entry path {:?}", entry_path);
                continue;
            }

            record_top_level(&mut top_level, &entry_path);
            let dest = extract_to.join(&entry_path);

            if file.is_dir() {
                runtime
                    .create_dir_all(&dest)
                    .with_context(|| format!("Failed to create directory {:?}", dest))?;
            } else {
                if let Some(parent) = dest.parent() {
                    runtime.create_dir_all(parent)?;
                }
                let mut writer = runtime
                    .create_file(&dest)
                    .with_context(|| format!("Failed to create file {:?}", dest))?;
                std::io::copy(&mut file, &mut writer)
                    .with_context(|| format!("Failed to extract {:?}", dest))?;

                if let Some(mode) = file.unix_mode() {
                    runtime.set_permissions(&dest, mode)?;
                }
            }
        }

        Ok(top_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn build_zip(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
    }

    #[test]
    fn test_can_handle() {
        let extractor = ZipExtractor;
        assert!(extractor.can_handle(Path::new("a.zip")));
        assert!(extractor.can_handle(Path::new("a.ZIP")));
        assert!(!extractor.can_handle(Path::new("a.tar.gz")));
    }

    #[test]
    fn test_extract_preserves_root_and_reports_it() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("cmake.zip");
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        build_zip(
            &archive_path,
            &[
                ("cmake-3.18.4-win64-x64/bin/cmake.exe", "pe"),
                ("cmake-3.18.4-win64-x64/doc/README", "docs"),
            ],
        );

        let top_level = ZipExtractor
            .extract(&RealRuntime, &archive_path, &out)
            .unwrap();

        assert_eq!(top_level, vec![PathBuf::from("cmake-3.18.4-win64-x64")]);
        assert_eq!(
            fs::read_to_string(out.join("cmake-3.18.4-win64-x64/bin/cmake.exe")).unwrap(),
            "pe"
        );
    }

    #[test]
    fn test_extract_fails_on_corrupt_archive() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("corrupt.zip");
        fs::write(&archive_path, b"this is not a zip file").unwrap();

        let result = ZipExtractor.extract(&RealRuntime, &archive_path, dir.path());
        assert!(result.is_err());
    }
}
