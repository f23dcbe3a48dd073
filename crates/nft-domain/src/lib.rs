#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod metadata;
pub mod naming;
pub mod platform;

pub use metadata::{MetadataError, NativeFileMetadata, SchemaVersion};
pub use naming::{executable_file_name, object_file_names, SidecarName};
pub use platform::{Platform, UnsupportedPlatform};
