//! Registry and package error types.

use std::fmt;

/// Package error codes.
pub mod codes {
    pub const PKG_SPEC_INVALID: &str = "PKG_SPEC_INVALID";
    pub const PKG_NOT_FOUND: &str = "PKG_NOT_FOUND";
    pub const PKG_REGISTRY_STATUS: &str = "PKG_REGISTRY_STATUS";
    pub const PKG_REGISTRY_ERROR: &str = "PKG_REGISTRY_ERROR";
    pub const PKG_RESPONSE_INVALID: &str = "PKG_RESPONSE_INVALID";
}

/// Package error.
///
/// Every registry failure carries one of the [`codes`], so callers can tell a
/// missing package apart from a server error, a transport failure or a body
/// that is not a package manifest.
#[derive(Debug, Clone)]
pub struct PkgError {
    code: &'static str,
    message: String,
}

impl PkgError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a spec invalid error.
    pub fn spec_invalid(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_SPEC_INVALID, msg)
    }

    /// Create a package not found error.
    #[must_use]
    pub fn not_found(name: &str, version: &str) -> Self {
        Self::new(
            codes::PKG_NOT_FOUND,
            format!("Package not found: {name}@{version}"),
        )
    }

    /// Create an error for a non-success status other than 404.
    #[must_use]
    pub fn registry_status(name: &str, version: &str, status: u16) -> Self {
        Self::new(
            codes::PKG_REGISTRY_STATUS,
            format!("Registry returned status {status} for '{name}@{version}'"),
        )
    }

    /// Create a registry (transport) error.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_REGISTRY_ERROR, msg)
    }

    /// Create a malformed response error.
    pub fn response_invalid(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_RESPONSE_INVALID, msg)
    }
}

impl fmt::Display for PkgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PkgError {}

impl From<reqwest::Error> for PkgError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(codes::PKG_REGISTRY_ERROR, format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::new(codes::PKG_REGISTRY_ERROR, format!("Connection failed: {e}"))
        } else {
            Self::new(codes::PKG_REGISTRY_ERROR, e.to_string())
        }
    }
}

impl From<serde_json::Error> for PkgError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(codes::PKG_RESPONSE_INVALID, format!("Invalid JSON: {e}"))
    }
}
