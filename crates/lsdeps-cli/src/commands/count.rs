//! `lsdeps <package>` command implementation.

use lsdeps_core::pkg::{
    count_dependencies, CountOptions, CountOutcome, CountReport, FailedFetch, NoopReporter,
    PackageSpec, PkgError, ResolveReporter,
};
use lsdeps_core::{Config, Error};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\x1b[2K\r";

/// Count command action.
#[derive(Debug, Clone)]
pub struct CountAction {
    /// Package as typed, optionally with `@version`.
    pub package: String,
    /// Explicit `--version`, wins over a version in `package`.
    pub version: Option<String>,
    pub options: CountOptions,
}

/// JSON output for a count.
#[derive(Serialize)]
struct CountResult {
    ok: bool,
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency_count: Option<usize>,
    errors: Vec<CountErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// A package that could not be fetched.
#[derive(Serialize)]
struct CountErrorInfo {
    name: String,
    specifier: String,
    code: String,
    message: String,
}

impl From<&FailedFetch> for CountErrorInfo {
    fn from(failure: &FailedFetch) -> Self {
        Self {
            name: failure.name.clone(),
            specifier: failure.specifier.clone(),
            code: failure.error.code().to_string(),
            message: failure.error.message().to_string(),
        }
    }
}

/// Writes progress and failures to stderr while counting.
struct TerminalReporter {
    /// Redraw a "Fetching ..." line for every fetch.
    progress: bool,
}

impl TerminalReporter {
    fn new(silent: bool) -> Self {
        Self {
            progress: !silent && io::stderr().is_terminal(),
        }
    }

    /// Wipe the progress line so the report starts on a clean line.
    fn finish(&self) {
        if self.progress {
            let mut err = io::stderr().lock();
            let _ = write!(err, "{CLEAR_LINE}");
            let _ = err.flush();
        }
    }
}

impl ResolveReporter for TerminalReporter {
    fn fetching(&self, name: &str, specifier: &str) {
        if self.progress {
            let mut err = io::stderr().lock();
            let _ = write!(err, "{}", progress_line(name, specifier));
            let _ = err.flush();
        }
    }

    fn fetch_failed(&self, name: &str, specifier: &str, _error: &PkgError) {
        let mut err = io::stderr().lock();
        if self.progress {
            let _ = write!(err, "{CLEAR_LINE}");
        }
        let _ = writeln!(err, "{}", missing_package_line(name, specifier));
    }
}

fn progress_line(name: &str, specifier: &str) -> String {
    format!("{CLEAR_LINE}Fetching dependencies for {name}@{specifier}")
}

fn missing_package_line(name: &str, specifier: &str) -> String {
    format!("{RED}ERROR: Package {name}@{specifier} does not exist{RESET}")
}

/// Pick the `(name, version)` pair to count from the command line.
fn root_target(action: &CountAction) -> Result<(String, String), PkgError> {
    let spec = PackageSpec::parse(&action.package)?;
    let version = match &action.version {
        Some(version) => version.clone(),
        None => spec.range_or_latest().to_string(),
    };
    Ok((spec.name, version))
}

/// Run the count command.
pub fn run(action: &CountAction, config: &Config, json: bool) -> Result<()> {
    let (name, version) = match root_target(action) {
        Ok(target) => target,
        Err(e) => {
            if json {
                let result = CountResult {
                    ok: false,
                    name: action.package.clone(),
                    version: action.version.clone().unwrap_or_default(),
                    url: None,
                    dependency_count: None,
                    errors: Vec::new(),
                    error: Some(format!("{}: {}", e.code(), e.message())),
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(2);
        }
    };

    let client = match config.registry_client() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            if json {
                let result = CountResult {
                    ok: false,
                    name,
                    version,
                    url: None,
                    dependency_count: None,
                    errors: Vec::new(),
                    error: Some(e.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(2);
        }
    };

    tracing::debug!(
        package = %name,
        version = %version,
        registry = %client.base_url(),
        "counting dependencies"
    );

    let terminal = (!json).then(|| Arc::new(TerminalReporter::new(config.silent)));
    let reporter: Arc<dyn ResolveReporter> = match &terminal {
        Some(terminal) => Arc::clone(terminal) as Arc<dyn ResolveReporter>,
        None => Arc::new(NoopReporter),
    };

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let result = runtime.block_on(count_dependencies(
        client,
        &name,
        &version,
        &action.options,
        reporter,
    ));

    if let Some(terminal) = &terminal {
        terminal.finish();
    }

    match result {
        Ok(outcome) => {
            print_outcome(&outcome, json);
            Ok(())
        }
        Err(Error::RootFetch {
            name,
            version,
            source,
        }) => {
            if json {
                let result = CountResult {
                    ok: false,
                    name,
                    version,
                    url: None,
                    dependency_count: None,
                    errors: Vec::new(),
                    error: Some(format!("{}: {}", source.code(), source.message())),
                };
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                eprintln!("{}", missing_package_line(&name, &version));
            }
            std::process::exit(1);
        }
        Err(e) => Err(e).into_diagnostic(),
    }
}

fn print_outcome(outcome: &CountOutcome, json: bool) {
    let report = CountReport::from(outcome);
    if json {
        let result = CountResult {
            ok: true,
            url: Some(report.package_url()),
            dependency_count: Some(report.dependency_count),
            name: report.name,
            version: report.version,
            errors: outcome.failures.iter().map(CountErrorInfo::from).collect(),
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        println!("\n{report}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(package: &str, version: Option<&str>) -> CountAction {
        CountAction {
            package: package.to_string(),
            version: version.map(str::to_string),
            options: CountOptions::default(),
        }
    }

    #[test]
    fn test_root_target_defaults_to_latest() {
        assert_eq!(
            root_target(&action("react", None)).unwrap(),
            ("react".to_string(), "latest".to_string())
        );
    }

    #[test]
    fn test_root_target_version_in_package() {
        assert_eq!(
            root_target(&action("@types/node@20.1.0", None)).unwrap(),
            ("@types/node".to_string(), "20.1.0".to_string())
        );
    }

    #[test]
    fn test_root_target_flag_wins() {
        assert_eq!(
            root_target(&action("react@17.0.0", Some("18.2.0"))).unwrap(),
            ("react".to_string(), "18.2.0".to_string())
        );
    }

    #[test]
    fn test_root_target_invalid() {
        assert!(root_target(&action("@broken", None)).is_err());
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line("react", "18.2.0"),
            "\x1b[2K\rFetching dependencies for react@18.2.0"
        );
    }

    #[test]
    fn test_missing_package_line() {
        assert_eq!(
            missing_package_line("left-pad", "^1.0.0"),
            "\x1b[31mERROR: Package left-pad@^1.0.0 does not exist\x1b[0m"
        );
    }

    #[test]
    fn test_json_result_omits_empty_fields() {
        let result = CountResult {
            ok: false,
            name: "nope".to_string(),
            version: "latest".to_string(),
            url: None,
            dependency_count: None,
            errors: Vec::new(),
            error: Some("PKG_NOT_FOUND: gone".to_string()),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ok"], false);
        assert!(value.get("url").is_none());
        assert!(value.get("dependency_count").is_none());
        assert_eq!(value["errors"].as_array().unwrap().len(), 0);
    }
}
