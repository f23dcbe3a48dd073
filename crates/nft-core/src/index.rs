use std::{
    collections::{BTreeMap, BTreeSet},
    env, fs,
    path::{Path, PathBuf},
};

use nft_domain::{
    executable_file_name, object_file_names, NativeFileMetadata, Platform, SidecarName,
};
use serde::Serialize;

use crate::{
    config::{IndexConfig, IndexOptions, PlatformFilter},
    error::{ArtifactKind, IndexError, LookupError},
};

type PathSets = BTreeMap<String, BTreeSet<PathBuf>>;

/// Counters gathered while scanning a directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub sidecars: usize,
    pub indexed: usize,
    pub skipped: usize,
}

/// Artifact paths for every test case described by the sidecars in one directory.
///
/// Built eagerly by scanning the directory and immutable afterwards, so a
/// shared reference can be handed to any number of readers.
#[derive(Clone, Debug)]
pub struct NativeFileTestsIndex {
    base_dir: PathBuf,
    filter: PlatformFilter,
    object_paths: PathSets,
    executable_paths: PathSets,
    stats: ScanStats,
}

impl NativeFileTestsIndex {
    /// Indexes every sidecar regardless of platform.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self, IndexError> {
        Self::build(base_dir, IndexOptions::unfiltered())
    }

    pub fn for_platform(
        base_dir: impl AsRef<Path>,
        platform: Platform,
    ) -> Result<Self, IndexError> {
        Self::build(base_dir, IndexOptions::for_platform(platform))
    }

    /// Indexes only sidecars built for the platform this process runs on.
    pub fn for_host(base_dir: impl AsRef<Path>) -> Result<Self, IndexError> {
        Self::build(
            base_dir,
            IndexOptions {
                platform: PlatformFilter::host()?,
            },
        )
    }

    /// Builds from `NFT_DIR` and `NFT_PLATFORM`.
    pub fn from_env() -> Result<Self, IndexError> {
        let config = IndexConfig::from_env()?;
        Self::build(&config.dir, config.options)
    }

    pub fn build(base_dir: impl AsRef<Path>, options: IndexOptions) -> Result<Self, IndexError> {
        let base_dir = absolutize(base_dir.as_ref())?;
        let mut index = Self {
            base_dir,
            filter: options.platform,
            object_paths: PathSets::new(),
            executable_paths: PathSets::new(),
            stats: ScanStats::default(),
        };
        index.scan()?;

        if let PlatformFilter::Only(platform) = index.filter {
            if index.executable_paths.is_empty() {
                return Err(IndexError::NoExecutables { platform });
            }
        }

        tracing::info!(
            dir = %index.base_dir.display(),
            platform = %index.filter,
            sidecars = index.stats.sidecars,
            indexed = index.stats.indexed,
            skipped = index.stats.skipped,
            "native_file_tests_indexed"
        );
        Ok(index)
    }

    fn scan(&mut self) -> Result<(), IndexError> {
        let read_dir_error = |source| IndexError::ReadDir {
            path: self.base_dir.clone(),
            source,
        };
        let mut sidecars = Vec::new();
        for entry in fs::read_dir(&self.base_dir).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            let path = entry.path();
            let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::debug!(path = %path.display(), "skipping non-utf8 entry");
                continue;
            };
            let Some(sidecar) = SidecarName::parse(&file_name) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            sidecars.push((sidecar.base_name.to_string(), path));
        }
        sidecars.sort();

        for (base_name, path) in sidecars {
            self.stats.sidecars += 1;
            let metadata = NativeFileMetadata::from_path(&path)?;
            if !self.filter.accepts(metadata.platform()) {
                tracing::debug!(
                    path = %path.display(),
                    platform = metadata.platform().unwrap_or("<none>"),
                    "skipping sidecar for another platform"
                );
                self.stats.skipped += 1;
                continue;
            }
            if let Some(declared) = metadata.base_name() {
                if declared != base_name {
                    tracing::warn!(
                        path = %path.display(),
                        declared,
                        file = %base_name,
                        "sidecar baseName differs from its file name; using the file name"
                    );
                }
            }
            tracing::debug!(
                path = %path.display(),
                schema = ?metadata.schema(),
                objects = metadata.object_digests().len(),
                "indexing sidecar"
            );
            self.record(&base_name, &metadata);
            self.stats.indexed += 1;
        }
        Ok(())
    }

    fn record(&mut self, base_name: &str, metadata: &NativeFileMetadata) {
        for name in object_file_names(base_name, metadata) {
            self.object_paths
                .entry(base_name.to_string())
                .or_default()
                .insert(self.base_dir.join(name));
        }
        let executable = self.base_dir.join(executable_file_name(base_name, metadata));
        self.executable_paths
            .entry(base_name.to_string())
            .or_default()
            .insert(executable);
    }

    /// Some object file recorded for `base_name`; which one is unspecified.
    pub fn first_object_path(&self, base_name: &str) -> Result<&Path, LookupError> {
        first_path(&self.object_paths, ArtifactKind::Object, base_name)
    }

    /// Some executable recorded for `base_name`; which one is unspecified.
    pub fn first_executable_path(&self, base_name: &str) -> Result<&Path, LookupError> {
        first_path(&self.executable_paths, ArtifactKind::Executable, base_name)
    }

    pub fn all_object_paths(&self) -> Vec<&Path> {
        flatten(&self.object_paths)
    }

    pub fn all_executable_paths(&self) -> Vec<&Path> {
        flatten(&self.executable_paths)
    }

    pub fn object_paths(&self, base_name: &str) -> Option<&BTreeSet<PathBuf>> {
        self.object_paths.get(base_name)
    }

    pub fn executable_paths(&self, base_name: &str) -> Option<&BTreeSet<PathBuf>> {
        self.executable_paths.get(base_name)
    }

    /// Every base name with at least one recorded artifact.
    pub fn base_names(&self) -> BTreeSet<&str> {
        self.object_paths
            .keys()
            .chain(self.executable_paths.keys())
            .map(String::as_str)
            .collect()
    }

    /// Derived paths with no file on disk. Only existence is checked, never content.
    pub fn missing_artifacts(&self) -> Vec<&Path> {
        self.all_object_paths()
            .into_iter()
            .chain(self.all_executable_paths())
            .filter(|path| !path.is_file())
            .collect()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn platform_filter(&self) -> PlatformFilter {
        self.filter
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

fn first_path<'a>(
    sets: &'a PathSets,
    kind: ArtifactKind,
    base_name: &str,
) -> Result<&'a Path, LookupError> {
    sets.get(base_name)
        .and_then(|paths| paths.iter().next())
        .map(PathBuf::as_path)
        .ok_or_else(|| LookupError::NotFound {
            kind,
            base_name: base_name.to_string(),
        })
}

fn flatten(sets: &PathSets) -> Vec<&Path> {
    sets.values()
        .flat_map(|paths| paths.iter().map(PathBuf::as_path))
        .collect()
}

fn absolutize(path: &Path) -> Result<PathBuf, IndexError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| IndexError::ReadDir {
            path: path.to_path_buf(),
            source,
        })
}
