//! Version specifier normalization.
//!
//! Turns whatever a manifest declares for a dependency into something the
//! registry can serve at `/<name>/<version>`: an exact version, the `next`
//! tag, or `latest`. No semver range solving happens here.

use regex::Regex;
use std::sync::OnceLock;

/// Tag used when a specifier cannot be turned into a concrete version.
pub const LATEST_TAG: &str = "latest";

/// Tag passed through unchanged.
pub const NEXT_TAG: &str = "next";

/// Single-digit `X.Y.Z` with an optional `-alpha.N`/`-beta.N`/`-rc.N` suffix,
/// anchored at the start only.
const EXACT_VERSION_PATTERN: &str = r"^[0-9]\.[0-9]\.[0-9](-(alpha|beta|rc)\.[0-9]+)?";

fn exact_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EXACT_VERSION_PATTERN).expect("literal pattern compiles"))
}

/// Normalize a version specifier into a registry-fetchable version or tag.
///
/// # Rules
/// - An exact version (`1.2.3`, `1.2.3-beta.4`) is returned unchanged
/// - `~X` or `^X`, where `X` is an exact version, returns `X`
/// - `next` is returned unchanged
/// - Anything else returns `latest`
///
/// The exact-version check only anchors at the start, so trailing text after
/// a matching prefix is kept as-is.
#[must_use]
pub fn normalize_specifier(specifier: &str) -> String {
    let re = exact_version_re();

    if re.is_match(specifier) {
        return specifier.to_string();
    }

    if let Some(rest) = specifier
        .strip_prefix('~')
        .or_else(|| specifier.strip_prefix('^'))
    {
        if re.is_match(rest) {
            return rest.to_string();
        }
    }

    if specifier == NEXT_TAG {
        return specifier.to_string();
    }

    LATEST_TAG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_versions_are_identity() {
        for v in ["1.2.3", "0.0.1", "9.9.9", "1.0.0-alpha.1", "2.3.4-beta.12", "4.0.0-rc.0"] {
            assert_eq!(normalize_specifier(v), v);
        }
    }

    #[test]
    fn test_range_prefix_is_stripped() {
        assert_eq!(normalize_specifier("^1.2.3"), "1.2.3");
        assert_eq!(normalize_specifier("~4.5.6"), "4.5.6");
        assert_eq!(normalize_specifier("^1.0.0-rc.2"), "1.0.0-rc.2");
    }

    #[test]
    fn test_next_tag_passes_through() {
        assert_eq!(normalize_specifier("next"), "next");
    }

    #[test]
    fn test_unrecognized_falls_back_to_latest() {
        for v in [
            "",
            "*",
            "1.x",
            "latest",
            "beta",
            ">=1.2.0 <2.0.0",
            "^^1.2.3",
            "~",
            "10.0.0",
            "^18.2.0",
            "git+https://github.com/a/b.git",
            "NEXT",
        ] {
            assert_eq!(normalize_specifier(v), "latest", "specifier {v:?}");
        }
    }

    #[test]
    fn test_match_is_anchored_at_start_only() {
        // Trailing text after a matching prefix is kept verbatim.
        assert_eq!(normalize_specifier("1.2.3 - 2.0.0"), "1.2.3 - 2.0.0");
        assert_eq!(normalize_specifier("1.2.34"), "1.2.34");
        assert_eq!(normalize_specifier("^1.2.3 || ^2.0.0"), "1.2.3 || ^2.0.0");
        assert_eq!(normalize_specifier(">1.2.3"), "latest");
    }

    #[test]
    fn test_prerelease_other_than_known_tags() {
        // The suffix group is optional, so the X.Y.Z prefix alone still matches.
        assert_eq!(normalize_specifier("1.2.3-canary.1"), "1.2.3-canary.1");
        assert_eq!(normalize_specifier("~1.2.3-canary.1"), "1.2.3-canary.1");
    }
}
