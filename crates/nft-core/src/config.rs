use std::{env, fmt, path::PathBuf};

use nft_domain::Platform;

use crate::error::IndexError;

pub const DIR_ENV: &str = "NFT_DIR";
pub const PLATFORM_ENV: &str = "NFT_PLATFORM";

/// Which records index construction accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlatformFilter {
    /// Every record is indexed and an empty result is not an error.
    #[default]
    Any,
    /// Only records for this platform; finding no executables fails construction.
    Only(Platform),
}

impl PlatformFilter {
    /// Filters on the platform the current process runs on.
    pub fn host() -> Result<Self, IndexError> {
        Ok(Self::Only(Platform::host()?))
    }

    /// `any`/`all` disable filtering; anything else must name a supported OS.
    pub fn parse(value: &str) -> Result<Self, IndexError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" | "all" => Ok(Self::Any),
            other => Ok(Self::Only(Platform::from_os_name(other)?)),
        }
    }

    #[must_use]
    pub fn accepts(self, platform: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => expected.matches(platform),
        }
    }

    #[must_use]
    pub fn platform(self) -> Option<Platform> {
        match self {
            Self::Any => None,
            Self::Only(platform) => Some(platform),
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Only(platform) => write!(f, "{platform}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub platform: PlatformFilter,
}

impl IndexOptions {
    #[must_use]
    pub fn unfiltered() -> Self {
        Self {
            platform: PlatformFilter::Any,
        }
    }

    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform: PlatformFilter::Only(platform),
        }
    }
}

/// Directory and filter resolved from `NFT_DIR` / `NFT_PLATFORM`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    pub dir: PathBuf,
    pub options: IndexOptions,
}

impl IndexConfig {
    pub fn from_env() -> Result<Self, IndexError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = lookup(DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(IndexError::MissingConfig { var: DIR_ENV })?;
        let platform = match lookup(PLATFORM_ENV).filter(|value| !value.trim().is_empty()) {
            Some(value) => PlatformFilter::parse(&value)?,
            None => PlatformFilter::host()?,
        };
        Ok(Self {
            dir,
            options: IndexOptions { platform },
        })
    }
}
