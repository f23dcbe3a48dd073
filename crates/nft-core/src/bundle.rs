//! Unpacking of a packaged native-file-tests zip.

use std::{
    ffi::OsString,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use zip::ZipArchive;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to open fixture bundle {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fixture bundle {} is not a valid zip archive", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Open { .. } => "bundle_unreadable",
            Self::Archive { .. } => "bundle_invalid",
            Self::Write { .. } => "bundle_write_failed",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// False when `dest` already existed and nothing was touched.
    pub extracted: bool,
    pub files: Vec<PathBuf>,
}

/// Extracts every file of the bundle directly into `dest`, dropping the
/// archive's directory structure. An existing `dest` is left as it is.
///
/// Entries are unpacked into a sibling `.tmp` directory that is renamed onto
/// `dest` only once every entry was written, so a failed extraction never
/// leaves a `dest` that later calls would take as complete.
pub fn extract_bundle(bundle: &Path, dest: &Path) -> Result<ExtractSummary, BundleError> {
    if dest.exists() {
        tracing::debug!(dest = %dest.display(), "native file tests already extracted");
        return Ok(ExtractSummary::default());
    }

    let file = File::open(bundle).map_err(|source| BundleError::Open {
        path: bundle.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| BundleError::Archive {
        path: bundle.to_path_buf(),
        source,
    })?;

    let staging = dest.with_extension("tmp");
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(write_error(&staging))?;
    }
    fs::create_dir_all(&staging).map_err(write_error(&staging))?;
    let names = match unpack_flat(bundle, &mut archive, &staging) {
        Ok(names) => names,
        Err(err) => {
            discard_staging(&staging);
            return Err(err);
        }
    };
    if let Err(source) = fs::rename(&staging, dest) {
        discard_staging(&staging);
        return Err(BundleError::Write {
            path: dest.to_path_buf(),
            source,
        });
    }

    let mut files: Vec<PathBuf> = names.into_iter().map(|name| dest.join(name)).collect();
    files.sort();
    tracing::info!(
        bundle = %bundle.display(),
        dest = %dest.display(),
        files = files.len(),
        "extracted native file tests"
    );
    Ok(ExtractSummary {
        extracted: true,
        files,
    })
}

fn unpack_flat(
    bundle: &Path,
    archive: &mut ZipArchive<File>,
    dir: &Path,
) -> Result<Vec<OsString>, BundleError> {
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| BundleError::Archive {
            path: bundle.to_path_buf(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }
        let Some(file_name) = entry
            .enclosed_name()
            .and_then(Path::file_name)
            .map(ToOwned::to_owned)
        else {
            tracing::debug!(entry = entry.name(), "skipping unsafe bundle entry");
            continue;
        };
        let target = dir.join(&file_name);
        let mut outfile = File::create(&target).map_err(write_error(&target))?;
        io::copy(&mut entry, &mut outfile).map_err(write_error(&target))?;
        #[cfg(unix)]
        {
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                    .map_err(write_error(&target))?;
            }
        }
        names.push(file_name);
    }
    Ok(names)
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> BundleError {
    let path = path.to_path_buf();
    move |source| BundleError::Write { path, source }
}

fn discard_staging(staging: &Path) {
    if let Err(err) = fs::remove_dir_all(staging) {
        tracing::warn!(
            staging = %staging.display(),
            error = %err,
            "failed to clear bundle staging directory"
        );
    }
}
