//! npm registry client.

use super::error::PkgError;
use super::manifest::PackageManifest;
use crate::version::user_agent;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Environment variable to override registry URL.
pub const REGISTRY_ENV: &str = "LSDEPS_NPM_REGISTRY";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce the manifest of `name` at a concrete `version`.
///
/// The resolution engine only talks to this trait, so tests can swap the
/// HTTP client for an in-memory registry.
pub trait ManifestSource: Send + Sync {
    /// Fetch the manifest of one package version (or dist-tag).
    fn fetch_manifest(
        &self,
        name: &str,
        version: &str,
    ) -> impl Future<Output = Result<PackageManifest, PkgError>> + Send;
}

/// Registry client for fetching package manifests.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    http: Client,
}

impl RegistryClient {
    /// Create a new registry client with the given base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, PkgError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| PkgError::registry(format!("Invalid registry URL '{base_url}': {e}")))?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()
            .map_err(|e| PkgError::registry(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of a version manifest: `<registry>/<name>/<version>`.
    ///
    /// The name and version are appended as path segments, so the result
    /// always stays under the registry base URL.
    ///
    /// # Errors
    /// Returns `PKG_SPEC_INVALID` if the name is not a package name (or a
    /// scoped `@scope/name`) or the version is an empty or dot segment.
    pub fn manifest_url(&self, name: &str, version: &str) -> Result<Url, PkgError> {
        let segments = name_segments(name)?;
        if matches!(version, "" | "." | "..") {
            return Err(PkgError::spec_invalid(format!(
                "Invalid version '{version}' for '{name}'"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PkgError::registry(format!(
                    "Registry URL '{}' cannot hold a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments)
            .push(version);
        Ok(url)
    }

    /// Fetch the manifest for a package version or dist-tag.
    ///
    /// # Errors
    /// - `PKG_NOT_FOUND` on a 404
    /// - `PKG_REGISTRY_STATUS` on any other non-success status
    /// - `PKG_REGISTRY_ERROR` if the request itself fails
    /// - `PKG_RESPONSE_INVALID` if the body is not a manifest
    /// - `PKG_SPEC_INVALID` if the name or version cannot form a manifest URL
    pub async fn fetch_manifest(
        &self,
        name: &str,
        version: &str,
    ) -> Result<PackageManifest, PkgError> {
        let url = self.manifest_url(name, version)?;
        tracing::trace!(%url, "fetching manifest");

        let response = self.http.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PkgError::not_found(name, version));
        }

        if !status.is_success() {
            return Err(PkgError::registry_status(name, version, status.as_u16()));
        }

        let body = response.bytes().await?;
        PackageManifest::from_slice(&body).map_err(|e| {
            PkgError::response_invalid(format!("{name}@{version}: {}", e.message()))
        })
    }
}

/// Split a package name into URL path segments: `[name]` or `[@scope, name]`.
fn name_segments(name: &str) -> Result<Vec<&str>, PkgError> {
    let segments: Vec<&str> = name.split('/').collect();
    let shape_ok = match segments.as_slice() {
        [single] => !single.starts_with('@'),
        [scope, _] => scope.starts_with('@') && scope.len() > 1,
        _ => false,
    };
    let segments_ok = segments
        .iter()
        .all(|segment| !matches!(*segment, "" | "." | ".."));

    if shape_ok && segments_ok {
        Ok(segments)
    } else {
        Err(PkgError::spec_invalid(format!(
            "Invalid package name '{name}'"
        )))
    }
}

impl ManifestSource for RegistryClient {
    async fn fetch_manifest(&self, name: &str, version: &str) -> Result<PackageManifest, PkgError> {
        RegistryClient::fetch_manifest(self, name, version).await
    }
}
