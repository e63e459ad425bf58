#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use lsdeps_core::pkg::{CountOptions, RootCounting, DEFAULT_REGISTRY, REGISTRY_ENV};
use lsdeps_core::Config;
use miette::Result;

#[derive(Parser, Debug)]
#[command(name = "lsdeps")]
#[command(author, about = "Count the transitive dependencies of an npm package", long_about = None)]
struct Cli {
    /// The npm package to count dependencies for (e.g. "react" or "react@18.2.0")
    package: String,

    /// The version of the package being fetched [default: latest]
    #[arg(long, value_name = "VERSION")]
    version: Option<String>,

    /// Skip counting peer dependencies
    #[arg(short = 'p', long)]
    skip_peer: bool,

    /// Skip counting optional dependencies
    #[arg(short = 'o', long)]
    skip_optional: bool,

    /// Hide the "Fetching dependencies for <package>" progress line
    #[arg(long)]
    silent: bool,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long)]
    json: bool,

    /// Count the package itself along with its dependencies
    #[arg(long)]
    include_root: bool,

    /// Maximum number of registry requests in flight (unbounded if omitted)
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_concurrency: Option<usize>,

    /// npm registry to query
    #[arg(long, value_name = "URL", env = REGISTRY_ENV, default_value = DEFAULT_REGISTRY)]
    registry: String,

    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_verbosity(self.verbose)
            .with_json_logs(self.log_json)
            .with_registry(self.registry.clone())
            .with_silent(self.silent)
    }

    fn count_options(&self) -> CountOptions {
        CountOptions {
            skip_peer: self.skip_peer,
            skip_optional: self.skip_optional,
            root_counting: if self.include_root {
                RootCounting::Include
            } else {
                RootCounting::Exclude
            },
            max_concurrency: self.max_concurrency,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    logging::init(config.verbosity, config.json_logs);

    let action = commands::count::CountAction {
        package: cli.package.clone(),
        version: cli.version.clone(),
        options: cli.count_options(),
    };
    commands::count::run(&action, &config, cli.json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "lsdeps",
            "react",
            "-p",
            "-o",
            "--version",
            "18.2.0",
            "--include-root",
            "--max-concurrency",
            "8",
            "--registry",
            "http://127.0.0.1:4873/",
        ])
        .unwrap();

        let options = cli.count_options();
        assert!(options.skip_peer);
        assert!(options.skip_optional);
        assert_eq!(options.root_counting, RootCounting::Include);
        assert_eq!(options.max_concurrency, Some(8));
        assert_eq!(cli.version.as_deref(), Some("18.2.0"));
        assert_eq!(cli.config().registry, "http://127.0.0.1:4873/");
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["lsdeps", "express"]).unwrap();
        let options = cli.count_options();
        assert!(!options.skip_peer);
        assert!(!options.skip_optional);
        assert_eq!(options.root_counting, RootCounting::Exclude);
        assert_eq!(options.max_concurrency, None);
        assert!(cli.version.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["lsdeps", "react", "--max-concurrency", "0"]).is_err());
    }

    #[test]
    fn test_package_is_required() {
        assert!(Cli::try_parse_from(["lsdeps"]).is_err());
    }
}
