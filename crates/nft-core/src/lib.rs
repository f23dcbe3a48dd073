#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Lookup of native test fixture artifacts by test name.
//!
//! The fixture build drops, next to every compiled object and executable, a
//! `<base>.json.<tag>` sidecar recording the digests embedded in their file
//! names. [`NativeFileTestsIndex`] reads those sidecars once and answers
//! "where is the executable for `simple`" without the caller knowing any
//! digest. [`SymbolTable`] reads function addresses out of those
//! executables for debugger tests.

pub mod bundle;
pub mod config;
pub mod error;
pub mod index;
pub mod module;
pub mod symbols;

pub use bundle::{extract_bundle, BundleError, ExtractSummary};
pub use config::{IndexConfig, IndexOptions, PlatformFilter, DIR_ENV, PLATFORM_ENV};
pub use error::{ArtifactKind, IndexError, LookupError};
pub use index::{NativeFileTestsIndex, ScanStats};
pub use module::{render_constants_module, ModuleError, SymbolRequest};
pub use nft_domain::{NativeFileMetadata, Platform, SchemaVersion};
pub use symbols::{Symbol, SymbolError, SymbolTable};
