//! Package manifests as served by the registry.
//!
//! A manifest is the registry's view of one package version. Only the three
//! dependency sections matter here; everything else in the document is ignored.

use super::error::PkgError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Manifest section holding regular dependencies.
pub const DEPENDENCIES: &str = "dependencies";
/// Manifest section holding peer dependencies.
pub const PEER_DEPENDENCIES: &str = "peerDependencies";
/// Manifest section holding optional dependencies.
pub const OPTIONAL_DEPENDENCIES: &str = "optionalDependencies";

/// Dependency sections of one package version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    /// `dependencies`: name -> specifier.
    pub dependencies: BTreeMap<String, String>,
    /// `peerDependencies`: name -> specifier.
    pub peer_dependencies: BTreeMap<String, String>,
    /// `optionalDependencies`: name -> specifier.
    pub optional_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parse a manifest from a raw response body.
    ///
    /// # Errors
    /// Returns `PKG_RESPONSE_INVALID` if the body is not JSON or not an object.
    pub fn from_slice(body: &[u8]) -> Result<Self, PkgError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value)
    }

    /// Build a manifest from a parsed JSON document.
    ///
    /// Sections that are missing or not objects are treated as empty, and
    /// entries whose specifier is not a string are skipped.
    ///
    /// # Errors
    /// Returns `PKG_RESPONSE_INVALID` if the document is not a JSON object
    /// (the registry answers `"Not Found"` for unknown packages on some paths).
    pub fn from_value(value: &Value) -> Result<Self, PkgError> {
        let root = value.as_object().ok_or_else(|| {
            PkgError::response_invalid(format!(
                "Expected a package manifest object, got {}",
                json_type_name(value)
            ))
        })?;

        Ok(Self {
            dependencies: read_section(root, DEPENDENCIES),
            peer_dependencies: read_section(root, PEER_DEPENDENCIES),
            optional_dependencies: read_section(root, OPTIONAL_DEPENDENCIES),
        })
    }
}

fn read_section(root: &serde_json::Map<String, Value>, section: &str) -> BTreeMap<String, String> {
    let Some(section_value) = root.get(section) else {
        return BTreeMap::new();
    };

    let Some(section_obj) = section_value.as_object() else {
        tracing::debug!(
            section,
            kind = json_type_name(section_value),
            "ignoring dependency section that is not an object"
        );
        return BTreeMap::new();
    };

    let mut deps = BTreeMap::new();
    for (name, range_value) in section_obj {
        if let Some(range) = range_value.as_str() {
            deps.insert(name.clone(), range.to_string());
        } else {
            tracing::debug!(
                section,
                dependency = %name,
                kind = json_type_name(range_value),
                "skipping dependency with non-string specifier"
            );
        }
    }
    deps
}

/// Get a human-readable type name for a JSON value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Merge the dependency sections to explore next.
///
/// Sections are copied in a fixed order: `dependencies`, then
/// `peerDependencies` (unless `skip_peer`), then `optionalDependencies`
/// (unless `skip_optional`). A later section overwrites the specifier of a
/// name already present.
#[must_use]
pub fn extract_dependencies(
    manifest: &PackageManifest,
    skip_peer: bool,
    skip_optional: bool,
) -> BTreeMap<String, String> {
    let mut deps = manifest.dependencies.clone();

    if !skip_peer {
        deps.extend(
            manifest
                .peer_dependencies
                .iter()
                .map(|(name, range)| (name.clone(), range.clone())),
        );
    }

    if !skip_optional {
        deps.extend(
            manifest
                .optional_dependencies
                .iter()
                .map(|(name, range)| (name.clone(), range.clone())),
        );
    }

    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::error::codes;
    use serde_json::json;

    fn manifest() -> PackageManifest {
        PackageManifest::from_value(&json!({
            "name": "pkg",
            "version": "1.0.0",
            "dependencies": { "a": "^1.0.0", "shared": "1.0.0" },
            "peerDependencies": { "p": "^2.0.0", "shared": "2.0.0", "po": "3.0.0" },
            "optionalDependencies": { "o": "~3.0.0", "po": "4.0.0" }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_sections() {
        let m = manifest();
        assert_eq!(m.dependencies.len(), 2);
        assert_eq!(m.peer_dependencies.len(), 3);
        assert_eq!(m.optional_dependencies.len(), 2);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let m = PackageManifest::from_value(&json!({ "name": "leaf" })).unwrap();
        assert_eq!(m, PackageManifest::default());
        assert!(extract_dependencies(&m, false, false).is_empty());
    }

    #[test]
    fn test_non_object_section_and_non_string_range_are_skipped() {
        let m = PackageManifest::from_value(&json!({
            "dependencies": { "a": "1.0.0", "b": 42, "c": null },
            "peerDependencies": ["not", "an", "object"]
        }))
        .unwrap();
        assert_eq!(m.dependencies.keys().collect::<Vec<_>>(), vec!["a"]);
        assert!(m.peer_dependencies.is_empty());
    }

    #[test]
    fn test_not_found_body_is_invalid() {
        let err = PackageManifest::from_slice(br#""Not Found""#).unwrap_err();
        assert_eq!(err.code(), codes::PKG_RESPONSE_INVALID);

        let err = PackageManifest::from_slice(b"<html>").unwrap_err();
        assert_eq!(err.code(), codes::PKG_RESPONSE_INVALID);
    }

    #[test]
    fn test_extract_all_sections() {
        let deps = extract_dependencies(&manifest(), false, false);
        assert_eq!(
            deps.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "o", "p", "po", "shared"]
        );
    }

    #[test]
    fn test_extract_merge_order() {
        let deps = extract_dependencies(&manifest(), false, false);
        // peer overwrites direct, optional overwrites peer
        assert_eq!(deps["shared"], "2.0.0");
        assert_eq!(deps["po"], "4.0.0");

        let deps = extract_dependencies(&manifest(), false, true);
        assert_eq!(deps["po"], "3.0.0");
    }

    #[test]
    fn test_extract_skip_flags() {
        let m = manifest();
        for (skip_peer, skip_optional) in [(false, false), (true, false), (false, true), (true, true)] {
            let deps = extract_dependencies(&m, skip_peer, skip_optional);

            for name in m.dependencies.keys() {
                assert!(deps.contains_key(name), "direct dependency {name} missing");
            }
            assert_eq!(deps.contains_key("p"), !skip_peer);
            assert_eq!(deps.contains_key("o"), !skip_optional);
            // `po` is declared as both peer and optional
            assert_eq!(deps.contains_key("po"), !skip_peer || !skip_optional);
        }
    }

    #[test]
    fn test_skipped_peer_does_not_touch_direct_specifier() {
        let deps = extract_dependencies(&manifest(), true, true);
        assert_eq!(deps["shared"], "1.0.0");
        assert_eq!(deps.len(), 2);
    }
}
