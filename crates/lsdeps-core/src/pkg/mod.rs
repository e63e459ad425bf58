//! Package registry functionality.
//!
//! Provides utilities for:
//! - Parsing package specifications (name@version) and npm aliases
//! - Normalizing dependency specifiers into fetchable versions
//! - Fetching version manifests from the npm registry
//! - Extracting dependency sections from manifests
//! - Counting the transitive dependency closure of a package

pub mod error;
pub mod manifest;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod spec;
pub mod version;

pub use error::{codes as pkg_codes, PkgError};
pub use manifest::{extract_dependencies, PackageManifest};
pub use registry::{ManifestSource, RegistryClient, DEFAULT_REGISTRY, REGISTRY_ENV};
pub use report::CountReport;
pub use resolve::{
    count_dependencies, fetch_target, CountOptions, CountOutcome, FailedFetch, NoopReporter,
    ResolveReporter, RootCounting,
};
pub use spec::{resolve_alias, PackageSpec};
pub use version::normalize_specifier;
