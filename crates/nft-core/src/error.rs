use std::{fmt, path::PathBuf};

use nft_domain::{MetadataError, Platform, UnsupportedPlatform};

/// Failures that abort index construction; no index is returned alongside them.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),
    #[error("failed to list native file tests directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("failed to locate executables for {platform}")]
    NoExecutables { platform: Platform },
    #[error("{var} is not set; point it at the native file tests directory")]
    MissingConfig { var: &'static str },
}

impl IndexError {
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform(_) => "unsupported_platform",
            Self::ReadDir { .. } => "directory_unreadable",
            Self::Metadata(err) => err.reason(),
            Self::NoExecutables { .. } => "no_executables_found",
            Self::MissingConfig { .. } => "missing_config",
        }
    }

    /// Configuration problems the caller can fix, as opposed to I/O or corrupt sidecars.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform(_) | Self::NoExecutables { .. } | Self::MissingConfig { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Object,
    Executable,
}

impl ArtifactKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Executable => "executable",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query for a base name with nothing recorded; local to the one call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {kind} recorded for '{base_name}'")]
    NotFound {
        kind: ArtifactKind,
        base_name: String,
    },
}

impl LookupError {
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "lookup_miss",
        }
    }
}
