//! File-name conventions shared by the fixture build and the index.
//!
//! Sidecars are named `<base>.json.<tag>`, optionally with qualifiers
//! between the base and `.json.`. Artifacts embed their digest: objects as
//! `<base>.<unit>.<digest>[suffix]`, executables as `<base>.<digest>[suffix]`
//! or `<base>.debug.<digest>[suffix]`.

use crate::metadata::NativeFileMetadata;

const SEPARATOR: char = '.';
const SIDECAR_MARKER: &str = ".json.";
const DEBUG_MARKER: &str = "debug";

/// A file name recognised as a metadata sidecar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidecarName<'a> {
    pub base_name: &'a str,
    pub tag: &'a str,
}

impl<'a> SidecarName<'a> {
    /// Returns `None` unless the name contains `.json.` followed by a tag.
    ///
    /// The base name is always the first `.`-separated segment, so
    /// `simple.linux.json.v3` belongs to `simple`.
    #[must_use]
    pub fn parse(file_name: &'a str) -> Option<Self> {
        let (head, tag) = file_name.split_once(SIDECAR_MARKER)?;
        if tag.is_empty() {
            return None;
        }
        let base_name = head.split(SEPARATOR).next().filter(|base| !base.is_empty())?;
        Some(Self { base_name, tag })
    }
}

/// Object file names for every unit in the record.
#[must_use]
pub fn object_file_names(base_name: &str, metadata: &NativeFileMetadata) -> Vec<String> {
    let suffix = metadata.object_suffix().unwrap_or_default();
    metadata
        .object_digests()
        .iter()
        .map(|(unit, digest)| format!("{base_name}.{unit}.{digest}{suffix}"))
        .collect()
}

/// Executable file name; a debug digest takes priority over the primary one.
#[must_use]
pub fn executable_file_name(base_name: &str, metadata: &NativeFileMetadata) -> String {
    let suffix = metadata.executable_suffix().unwrap_or_default();
    match metadata.debug_digest() {
        Some(debug) => format!("{base_name}.{DEBUG_MARKER}.{debug}{suffix}"),
        None => format!("{base_name}.{}{suffix}", metadata.executable_digest()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> NativeFileMetadata {
        NativeFileMetadata::from_slice(json.as_bytes()).expect("valid metadata")
    }

    #[test]
    fn recognises_sidecar_names() {
        assert_eq!(
            SidecarName::parse("simple.json.v3"),
            Some(SidecarName {
                base_name: "simple",
                tag: "v3"
            })
        );
        assert_eq!(
            SidecarName::parse("simple-debug-noopt-dynamic.json.linux.x86_64")
                .map(|name| name.tag),
            Some("linux.x86_64")
        );
    }

    #[test]
    fn qualifiers_before_the_marker_keep_the_first_segment() {
        assert_eq!(
            SidecarName::parse("simple.linux.json.v3"),
            Some(SidecarName {
                base_name: "simple",
                tag: "v3"
            })
        );
        assert_eq!(
            SidecarName::parse("waitthread.darwin.x86_64.json.v1").map(|name| name.base_name),
            Some("waitthread")
        );
    }

    #[test]
    fn ignores_artifacts_and_partial_names() {
        assert_eq!(SidecarName::parse("simple.main.aaaa.o"), None);
        assert_eq!(SidecarName::parse("simple.bbbb"), None);
        assert_eq!(SidecarName::parse("simple.json"), None);
        assert_eq!(SidecarName::parse("simple.json."), None);
        assert_eq!(SidecarName::parse(".json.v1"), None);
        assert_eq!(SidecarName::parse(".linux.json.v1"), None);
        assert_eq!(SidecarName::parse("simple.linux.json"), None);
        assert_eq!(SidecarName::parse("simple.jsonx.v1"), None);
        assert_eq!(SidecarName::parse("simple"), None);
    }

    #[test]
    fn composes_object_names_with_optional_suffix() {
        let with_suffix = record(
            r#"{"objectDigests": {"main": "aaaa", "lib": "cccc"}, "objectSuffix": ".o",
                "executableDigest": "bbbb", "machine": "x86_64", "flags": {}, "compiler": "gcc"}"#,
        );
        assert_eq!(
            object_file_names("simple", &with_suffix),
            vec!["simple.lib.cccc.o".to_string(), "simple.main.aaaa.o".to_string()]
        );

        let without = record(
            r#"{"objectSha1s": {"main": "aaaa"}, "executableSha1": "bbbb",
                "machine": "x86_64", "flags": {}, "compiler": "gcc"}"#,
        );
        assert_eq!(object_file_names("simple", &without), vec!["simple.main.aaaa"]);
    }

    #[test]
    fn debug_digest_wins_for_executables() {
        let debug = record(
            r#"{"objectDigests": {}, "executableDigest": "bbbb", "debugDigest": "dddd",
                "executableSuffix": ".exe", "machine": "x86_64", "flags": {}, "compiler": "gcc"}"#,
        );
        assert_eq!(executable_file_name("simple", &debug), "simple.debug.dddd.exe");

        let plain = record(
            r#"{"objectDigests": {}, "executableDigest": "bbbb", "executableSuffix": "",
                "machine": "x86_64", "flags": {}, "compiler": "gcc"}"#,
        );
        assert_eq!(executable_file_name("simple", &plain), "simple.bbbb");
    }
}
