//! Package spec parsing.
//!
//! Parses package specifications like:
//! - `react`
//! - `react@18.2.0`
//! - `react@^18.0.0`
//! - `@types/node`
//! - `@types/node@^20`
//!
//! and npm alias specifiers of the form `npm:<name>@<specifier>`.

use super::error::PkgError;
use super::version::LATEST_TAG;

/// Prefix of an aliasing specifier (`"bar": "npm:foo@1.2.3"`).
pub const ALIAS_PREFIX: &str = "npm:";

/// A parsed package specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Full package name (e.g., "@scope/name" or "name").
    pub name: String,
    /// Scope without the @ prefix, if scoped.
    pub scope: Option<String>,
    /// Version range or tag (None means latest).
    pub range: Option<String>,
}

impl PackageSpec {
    /// Parse a package specification string.
    ///
    /// # Errors
    /// Returns an error if the spec is invalid.
    pub fn parse(input: &str) -> Result<Self, PkgError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(PkgError::spec_invalid("Empty package spec"));
        }

        if input.starts_with('@') {
            Self::parse_scoped(input)
        } else {
            Self::parse_unscoped(input)
        }
    }

    fn parse_scoped(input: &str) -> Result<Self, PkgError> {
        let Some(slash_pos) = input.find('/') else {
            return Err(PkgError::spec_invalid(format!(
                "Invalid scoped package: missing '/' in '{input}'"
            )));
        };

        if slash_pos == 1 {
            return Err(PkgError::spec_invalid(format!(
                "Invalid scoped package: empty scope in '{input}'"
            )));
        }

        let scope = &input[1..slash_pos];
        let after_slash = &input[slash_pos + 1..];

        if after_slash.is_empty() {
            return Err(PkgError::spec_invalid(format!(
                "Invalid scoped package: empty name in '{input}'"
            )));
        }

        // The version delimiter is the first @ after the scope
        if let Some(at_pos) = after_slash.find('@') {
            let pkg_name = &after_slash[..at_pos];
            let range = &after_slash[at_pos + 1..];

            if pkg_name.is_empty() {
                return Err(PkgError::spec_invalid(format!(
                    "Invalid scoped package: empty name in '{input}'"
                )));
            }

            if range.is_empty() {
                return Err(PkgError::spec_invalid(format!(
                    "Invalid package spec: empty version range in '{input}'"
                )));
            }

            Ok(Self {
                name: format!("@{scope}/{pkg_name}"),
                scope: Some(scope.to_string()),
                range: Some(range.to_string()),
            })
        } else {
            Ok(Self {
                name: input.to_string(),
                scope: Some(scope.to_string()),
                range: None,
            })
        }
    }

    fn parse_unscoped(input: &str) -> Result<Self, PkgError> {
        if let Some(at_pos) = input.find('@') {
            let name = &input[..at_pos];
            let range = &input[at_pos + 1..];

            if name.is_empty() {
                return Err(PkgError::spec_invalid(format!(
                    "Invalid package spec: empty name in '{input}'"
                )));
            }

            if range.is_empty() {
                return Err(PkgError::spec_invalid(format!(
                    "Invalid package spec: empty version range in '{input}'"
                )));
            }

            Self::validate_name(name)?;

            Ok(Self {
                name: name.to_string(),
                scope: None,
                range: Some(range.to_string()),
            })
        } else {
            Self::validate_name(input)?;

            Ok(Self {
                name: input.to_string(),
                scope: None,
                range: None,
            })
        }
    }

    fn validate_name(name: &str) -> Result<(), PkgError> {
        if name.is_empty() {
            return Err(PkgError::spec_invalid("Empty package name"));
        }

        for c in name.chars() {
            if !c.is_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(PkgError::spec_invalid(format!(
                    "Invalid character '{c}' in package name '{name}'"
                )));
            }
        }

        Ok(())
    }

    /// The range, or `latest` when none was given.
    #[must_use]
    pub fn range_or_latest(&self) -> &str {
        self.range.as_deref().unwrap_or(LATEST_TAG)
    }
}

/// Follow an `npm:` alias.
///
/// For `("bar", "npm:foo@1.2.3")` returns `("foo", "1.2.3")`; any other
/// specifier is returned untouched along with the original name. An alias
/// without a version resolves to `latest`. If the alias target cannot be
/// parsed, the original name is kept and the raw target becomes the
/// specifier, which normalization will turn into `latest`.
#[must_use]
pub fn resolve_alias(name: &str, specifier: &str) -> (String, String) {
    let Some(target) = specifier.strip_prefix(ALIAS_PREFIX) else {
        return (name.to_string(), specifier.to_string());
    };

    match PackageSpec::parse(target) {
        Ok(spec) => {
            let range = spec.range_or_latest().to_string();
            (spec.name, range)
        }
        Err(_) => (name.to_string(), target.to_string()),
    }
}
