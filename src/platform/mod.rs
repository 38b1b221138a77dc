//! Host platform classification for CMake release archives.
//!
//! CMake publishes one archive per platform identifier (e.g.
//! `cmake-3.18.4-Linux-x86_64.tar.gz`). Older releases use broader
//! identifiers, so each platform maps to an ordered candidate list from
//! most-specific to most-portable. The order is significant and the list is
//! never reordered; the installer walks it front to back.

/// Host OS/pointer-width classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArchitecture {
    Linux64,
    Linux32,
    Darwin64,
    Darwin32,
    Windows64,
    Windows32,
}

/// The OS/arch combination has no known CMake release archive naming.
#[derive(Debug, PartialEq)]
pub struct UnsupportedPlatform {
    pub os_name: String,
    pub arch_bits: u32,
}

impl std::fmt::Display for UnsupportedPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unsupported platform: {} ({}-bit)",
            self.os_name, self.arch_bits
        )
    }
}

impl std::error::Error for UnsupportedPlatform {}

/// Classify an OS name (as reported in the `Linux`/`Darwin`/`Windows_NT`
/// convention) and pointer width into a [`PlatformArchitecture`].
/// Anything outside the known table is [`UnsupportedPlatform`].
pub fn classify(os_name: &str, arch_bits: u32) -> Result<PlatformArchitecture, UnsupportedPlatform> {
    use PlatformArchitecture::*;
    match (os_name, arch_bits) {
        ("Linux", 64) => Ok(Linux64),
        ("Linux", 32) => Ok(Linux32),
        ("Darwin", 64) => Ok(Darwin64),
        ("Darwin", 32) => Ok(Darwin32),
        ("Windows_NT", 64) => Ok(Windows64),
        ("Windows_NT", 32) => Ok(Windows32),
        _ => Err(UnsupportedPlatform {
            os_name: os_name.to_string(),
            arch_bits,
        }),
    }
}

impl PlatformArchitecture {
    /// Ordered archive-identifier candidates, most-specific first.
    pub fn candidates(self) -> &'static [&'static str] {
        use PlatformArchitecture::*;
        match self {
            Linux64 => &["Linux-x86_64", "Linux-i386"],
            Linux32 => &["Linux-i386"],
            Darwin64 => &["Darwin-x86_64", "Darwin64-universal", "Darwin-universal"],
            Darwin32 => &["Darwin-universal"],
            Windows64 => &["win64-x64", "win32-x86"],
            Windows32 => &["win32-x86"],
        }
    }

    /// Archive filename extension for this platform's release archives.
    pub fn archive_extension(self) -> &'static str {
        use PlatformArchitecture::*;
        match self {
            Linux64 | Linux32 | Darwin64 | Darwin32 => ".tar.gz",
            Windows64 | Windows32 => ".zip",
        }
    }
}

/// OS name of the running host in the `Linux`/`Darwin`/`Windows_NT` convention.
pub fn host_os_name() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "Linux"
    }
    #[cfg(target_os = "macos")]
    {
        "Darwin"
    }
    #[cfg(target_os = "windows")]
    {
        "Windows_NT"
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        std::env::consts::OS
    }
}

/// Pointer width of the running host.
pub fn host_arch_bits() -> u32 {
    #[cfg(target_pointer_width = "64")]
    {
        64
    }
    #[cfg(target_pointer_width = "32")]
    {
        32
    }
    #[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
    {
        0
    }
}

/// Classify the running host.
pub fn detect() -> Result<PlatformArchitecture, UnsupportedPlatform> {
    classify(host_os_name(), host_arch_bits())
}
