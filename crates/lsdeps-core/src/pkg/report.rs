//! The user-facing result of a dependency count.

use super::resolve::CountOutcome;
use serde::Serialize;
use std::fmt;

/// Public package site used for links in the report.
pub const PACKAGE_SITE: &str = "https://npmjs.com";

/// What gets shown to the user once counting finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountReport {
    /// Root package name.
    pub name: String,
    /// Root version or tag as requested.
    pub version: String,
    /// Number of distinct packages in the closure.
    pub dependency_count: usize,
}

impl CountReport {
    /// Create a report.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, dependency_count: usize) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependency_count,
        }
    }

    /// Link to the package page for the requested version.
    #[must_use]
    pub fn package_url(&self) -> String {
        format!("{PACKAGE_SITE}/package/{}/v/{}", self.name, self.version)
    }
}

impl From<&CountOutcome> for CountReport {
    fn from(outcome: &CountOutcome) -> Self {
        Self::new(
            outcome.root_name.clone(),
            outcome.root_specifier.clone(),
            outcome.dependency_count,
        )
    }
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "URL: {}", self.package_url())?;
        write!(f, "Dependency count: {}", self.dependency_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let report = CountReport::new("express", "4.0.0", 30);
        assert_eq!(
            report.to_string(),
            "Name: express\nURL: https://npmjs.com/package/express/v/4.0.0\nDependency count: 30"
        );
    }

    #[test]
    fn test_scoped_url() {
        let report = CountReport::new("@types/node", "latest", 1);
        assert_eq!(
            report.package_url(),
            "https://npmjs.com/package/@types/node/v/latest"
        );
    }
}
