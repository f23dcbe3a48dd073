use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Sidecar schema generation, detected from which optional fields a record carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Digests, machine, platform, flags and compiler only.
    V1,
    /// Adds `baseName` and the debug/stripped executable variants.
    V2,
    /// Adds `configName` and explicit object/executable suffixes.
    V3,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to read metadata file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse metadata file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MetadataError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Read { .. } => "metadata_unreadable",
            Self::Parse { .. } => "metadata_invalid",
        }
    }
}

/// One parsed `<base>.json.<tag>` sidecar.
///
/// Covers every schema generation at once: fields introduced later are
/// optional, and the digest fields also accept their older `*Sha1` names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_suffix: Option<String>,
    #[serde(alias = "objectSha1s")]
    object_digests: BTreeMap<String, String>,
    #[serde(
        default,
        alias = "strippedSha1",
        skip_serializing_if = "Option::is_none"
    )]
    stripped_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    executable_suffix: Option<String>,
    #[serde(alias = "executableSha1")]
    executable_digest: String,
    #[serde(default, alias = "debugSha1", skip_serializing_if = "Option::is_none")]
    debug_digest: Option<String>,
    machine: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
    flags: BTreeMap<String, String>,
    compiler: String,
}

impl NativeFileMetadata {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Reads and parses the sidecar at `path`.
    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|source| MetadataError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn schema(&self) -> SchemaVersion {
        if self.config_name.is_some()
            || self.object_suffix.is_some()
            || self.executable_suffix.is_some()
        {
            SchemaVersion::V3
        } else if self.base_name.is_some()
            || self.debug_digest.is_some()
            || self.stripped_digest.is_some()
        {
            SchemaVersion::V2
        } else {
            SchemaVersion::V1
        }
    }

    /// The record's own `baseName`, falling back to the name taken from the sidecar file.
    #[must_use]
    pub fn resolved_base_name<'a>(&'a self, candidate: &'a str) -> &'a str {
        self.base_name.as_deref().unwrap_or(candidate)
    }

    #[must_use]
    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    #[must_use]
    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    #[must_use]
    pub fn object_suffix(&self) -> Option<&str> {
        self.object_suffix.as_deref()
    }

    #[must_use]
    pub fn object_digests(&self) -> &BTreeMap<String, String> {
        &self.object_digests
    }

    #[must_use]
    pub fn stripped_digest(&self) -> Option<&str> {
        self.stripped_digest.as_deref()
    }

    #[must_use]
    pub fn executable_suffix(&self) -> Option<&str> {
        self.executable_suffix.as_deref()
    }

    #[must_use]
    pub fn executable_digest(&self) -> &str {
        &self.executable_digest
    }

    #[must_use]
    pub fn debug_digest(&self) -> Option<&str> {
        self.debug_digest.as_deref()
    }

    #[must_use]
    pub fn machine(&self) -> &str {
        &self.machine
    }

    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, String> {
        &self.flags
    }

    #[must_use]
    pub fn compiler(&self) -> &str {
        &self.compiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const V1_JSON: &str = r#"{
        "objectSha1s": {"simple": "0a1b"},
        "executableSha1": "2c3d",
        "machine": "x86_64",
        "platform": "linux",
        "flags": {"opt": "noopt"},
        "compiler": "gcc"
    }"#;

    const V3_JSON: &str = r#"{
        "configName": "debug-noopt-dynamic",
        "baseName": "simple",
        "objectSuffix": ".o",
        "objectDigests": {"main": "aaaa"},
        "executableSuffix": "",
        "executableDigest": "bbbb",
        "machine": "x86_64",
        "platform": "linux",
        "flags": {},
        "compiler": "clang"
    }"#;

    #[test]
    fn parses_first_generation_field_names() {
        let metadata = NativeFileMetadata::from_slice(V1_JSON.as_bytes()).expect("parse v1");
        assert_eq!(metadata.schema(), SchemaVersion::V1);
        assert_eq!(metadata.executable_digest(), "2c3d");
        assert_eq!(
            metadata.object_digests().get("simple").map(String::as_str),
            Some("0a1b")
        );
        assert_eq!(metadata.base_name(), None);
        assert_eq!(metadata.debug_digest(), None);
        assert_eq!(metadata.flags().get("opt").map(String::as_str), Some("noopt"));
    }

    #[test]
    fn latest_schema_exposes_suffixes() {
        let metadata = NativeFileMetadata::from_slice(V3_JSON.as_bytes()).expect("parse v3");
        assert_eq!(metadata.schema(), SchemaVersion::V3);
        assert_eq!(metadata.config_name(), Some("debug-noopt-dynamic"));
        assert_eq!(metadata.object_suffix(), Some(".o"));
        // an empty suffix is present, not absent
        assert_eq!(metadata.executable_suffix(), Some(""));
        assert_eq!(metadata.compiler(), "clang");
    }

    #[test]
    fn debug_variant_marks_second_generation() {
        let json = r#"{
            "baseName": "waitthread",
            "objectSha1s": {"waitthread": "11"},
            "executableSha1": "22",
            "debugSha1": "33",
            "machine": "x86_64",
            "platform": "darwin",
            "flags": {},
            "compiler": "clang"
        }"#;
        let metadata = NativeFileMetadata::from_slice(json.as_bytes()).expect("parse v2");
        assert_eq!(metadata.schema(), SchemaVersion::V2);
        assert_eq!(metadata.debug_digest(), Some("33"));
        assert_eq!(metadata.platform(), Some("darwin"));
    }

    #[test]
    fn platform_is_optional_in_oldest_records() {
        let json = r#"{
            "objectSha1s": {},
            "executableSha1": "ff",
            "machine": "x86_64",
            "flags": {},
            "compiler": "gcc"
        }"#;
        let metadata = NativeFileMetadata::from_slice(json.as_bytes()).expect("parse");
        assert_eq!(metadata.platform(), None);
        assert!(metadata.object_digests().is_empty());
    }

    #[test]
    fn missing_executable_digest_is_a_parse_error() {
        let json = r#"{"objectDigests": {}, "machine": "x", "flags": {}, "compiler": "gcc"}"#;
        let err = NativeFileMetadata::from_slice(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("executableDigest"), "{err}");
    }

    #[test]
    fn resolved_base_name_prefers_record_field() {
        let v3 = NativeFileMetadata::from_slice(V3_JSON.as_bytes()).unwrap();
        assert_eq!(v3.resolved_base_name("other"), "simple");
        let v1 = NativeFileMetadata::from_slice(V1_JSON.as_bytes()).unwrap();
        assert_eq!(v1.resolved_base_name("simple"), "simple");
    }

    #[test]
    fn from_path_reports_offending_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.json.v1");
        fs::write(&path, "{ not json").unwrap();

        let err = NativeFileMetadata::from_path(&path).unwrap_err();
        assert_eq!(err.reason(), "metadata_invalid");
        assert_eq!(err.path(), path.as_path());

        let missing = temp.path().join("absent.json.v1");
        let err = NativeFileMetadata::from_path(&missing).unwrap_err();
        assert_eq!(err.reason(), "metadata_unreadable");
    }
}
