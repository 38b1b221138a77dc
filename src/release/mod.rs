//! CMake release versions and download URL assembly.
//!
//! Release archives live under `{files_base}/v{major}.{minor}/` on the
//! CMake download server; there is no patch-level directory segmentation.
//! Archive filenames are `cmake-{version}-{platform}{ext}`.

mod tags;

pub use tags::{CMAKE_TAGS_REPO, GitHubTags, ListTags, sorted_descending};

#[cfg(test)]
pub use tags::MockListTags;

use anyhow::anyhow;
use std::str::FromStr;

/// Default base URL for the CMake release file index.
pub const DEFAULT_FILES_URL: &str = "https://cmake.org/files";

/// A CMake release version such as `3.18.4`, parsed from a tag name that may
/// carry a leading `v`. Pre-release suffixes (`3.19.0-rc1`) are preserved in
/// the full version string and ignored for the major/minor decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: u32,
    pub minor: u32,
    version: String,
}

impl FromStr for ReleaseVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.trim().strip_prefix('v').unwrap_or(s.trim());
        let mut segments = version.split('.');

        let major = segments
            .next()
            .and_then(|seg| seg.parse::<u32>().ok())
            .ok_or_else(|| anyhow!("Invalid version '{}': expected 'major.minor[.patch]'", s))?;
        let minor = segments
            .next()
            .and_then(|seg| {
                // Tolerate suffixes like "19-rc1" by taking the leading digits.
                let digits: String = seg.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .ok_or_else(|| anyhow!("Invalid version '{}': expected 'major.minor[.patch]'", s))?;

        Ok(ReleaseVersion {
            major,
            minor,
            version: version.to_string(),
        })
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

impl ReleaseVersion {
    /// The full version string without the leading `v`.
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// Directory URL holding this version's release archives.
    pub fn files_dir_url(&self, files_base: &str) -> String {
        format!(
            "{}/v{}.{}/",
            files_base.trim_end_matches('/'),
            self.major,
            self.minor
        )
    }

    /// Archive filename for a platform candidate identifier.
    pub fn archive_file_name(&self, candidate: &str, extension: &str) -> String {
        format!("cmake-{}-{}{}", self.version, candidate, extension)
    }

    /// Full archive URL for a platform candidate identifier.
    pub fn archive_url(&self, files_base: &str, candidate: &str, extension: &str) -> String {
        format!(
            "{}{}",
            self.files_dir_url(files_base),
            self.archive_file_name(candidate, extension)
        )
    }
}
