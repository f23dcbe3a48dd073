use std::{fmt, str::FromStr};

use serde::Serialize;

pub const LINUX_PLATFORM: &str = "linux";
pub const DARWIN_PLATFORM: &str = "darwin";

/// Platform tag written into the `platform` field of a sidecar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Darwin,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unsupported OS '{os}' (expected linux or macOS)")]
pub struct UnsupportedPlatform {
    pub os: String,
}

impl Platform {
    /// Maps a reported OS name onto a platform tag.
    ///
    /// `linux` matches exactly (ignoring case); anything mentioning `mac`, or
    /// `darwin` itself, maps to [`Platform::Darwin`].
    pub fn from_os_name(os: &str) -> Result<Self, UnsupportedPlatform> {
        let normalized = os.trim().to_ascii_lowercase();
        if normalized == LINUX_PLATFORM {
            return Ok(Self::Linux);
        }
        if normalized == DARWIN_PLATFORM || normalized.contains("mac") {
            return Ok(Self::Darwin);
        }
        Err(UnsupportedPlatform { os: os.to_string() })
    }

    pub fn host() -> Result<Self, UnsupportedPlatform> {
        Self::from_os_name(std::env::consts::OS)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => LINUX_PLATFORM,
            Self::Darwin => DARWIN_PLATFORM,
        }
    }

    /// Whether a record's optional `platform` field names this platform.
    #[must_use]
    pub fn matches(self, platform: Option<&str>) -> bool {
        platform == Some(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_os_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_reported_os_names() {
        assert_eq!(Platform::from_os_name("Linux"), Ok(Platform::Linux));
        assert_eq!(Platform::from_os_name("linux"), Ok(Platform::Linux));
        assert_eq!(Platform::from_os_name("macos"), Ok(Platform::Darwin));
        assert_eq!(Platform::from_os_name("Mac OS X"), Ok(Platform::Darwin));
        assert_eq!(Platform::from_os_name("darwin"), Ok(Platform::Darwin));
    }

    #[test]
    fn rejects_other_operating_systems() {
        let err = Platform::from_os_name("windows").unwrap_err();
        assert_eq!(err.os, "windows");
        assert!(Platform::from_os_name("freebsd").is_err());
        assert!(Platform::from_os_name("linux-gnu").is_err());
    }

    #[test]
    fn matches_record_platform_field() {
        assert!(Platform::Linux.matches(Some("linux")));
        assert!(!Platform::Linux.matches(Some("darwin")));
        assert!(!Platform::Darwin.matches(None));
    }

    #[test]
    fn parses_from_str() {
        let platform: Platform = "Darwin".parse().unwrap();
        assert_eq!(platform.to_string(), "darwin");
    }
}
