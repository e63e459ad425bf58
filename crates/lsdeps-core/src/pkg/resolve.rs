//! Dependency counting.
//!
//! Walks the registry in waves starting from a root package. Every wave
//! spawns one task per pending (name, specifier) pair; each task fetches the
//! manifest, extracts its dependency sections and records newly seen names
//! for the next wave. A wave finishes only when all of its tasks have, and
//! the walk stops once a wave discovers nothing new.
//!
//! Names are deduplicated across the whole run, so every name is fetched at
//! most once and cyclic graphs terminate.

use super::error::PkgError;
use super::manifest::extract_dependencies;
use super::registry::ManifestSource;
use super::spec::resolve_alias;
use super::version::normalize_specifier;
use crate::error::Error;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

/// Whether the root package counts toward its own dependency count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootCounting {
    /// Report only what the root pulls in.
    #[default]
    Exclude,
    /// Report the root as part of its own closure.
    Include,
}

impl RootCounting {
    /// Turn the number of visited names (root included) into the reported count.
    #[must_use]
    pub fn count(self, visited: usize) -> usize {
        match self {
            Self::Exclude => visited.saturating_sub(1),
            Self::Include => visited,
        }
    }
}

/// Options for dependency counting.
#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// Do not follow peerDependencies.
    pub skip_peer: bool,
    /// Do not follow optionalDependencies.
    pub skip_optional: bool,
    /// How the root itself is counted.
    pub root_counting: RootCounting,
    /// Cap on in-flight registry requests. `None` spawns every fetch of a
    /// wave at once.
    pub max_concurrency: Option<usize>,
}

/// Receives progress and failure notifications while counting.
///
/// Both callbacks are invoked from worker tasks and must not block.
pub trait ResolveReporter: Send + Sync {
    /// A fetch for `name` is about to start.
    fn fetching(&self, _name: &str, _specifier: &str) {}

    /// Fetching `name` failed; it stays counted but is not explored further.
    fn fetch_failed(&self, _name: &str, _specifier: &str, _error: &PkgError) {}
}

/// Reporter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ResolveReporter for NoopReporter {}

/// A package whose manifest could not be fetched.
#[derive(Debug, Clone)]
pub struct FailedFetch {
    /// Name as declared by the dependent.
    pub name: String,
    /// Specifier as declared by the dependent.
    pub specifier: String,
    /// Why the fetch failed.
    pub error: PkgError,
}

/// Result of counting a package's dependency closure.
#[derive(Debug, Clone)]
pub struct CountOutcome {
    /// Root package name, after following an `npm:` alias.
    pub root_name: String,
    /// Root specifier, after following an `npm:` alias.
    pub root_specifier: String,
    /// Reported count, after applying [`RootCounting`].
    pub dependency_count: usize,
    /// Every name selected for fetching, root included.
    pub visited: BTreeSet<String>,
    /// Non-root packages that could not be fetched.
    pub failures: Vec<FailedFetch>,
    /// Number of waves run after the root fetch.
    pub waves: usize,
}

/// Shared state mutated by the tasks of a wave.
struct ResolveState {
    /// Every name ever selected for fetching.
    visited: BTreeSet<String>,
    /// Pairs queued for the next wave.
    frontier: BTreeMap<String, String>,
}

impl ResolveState {
    fn new(root_name: &str) -> Self {
        Self {
            visited: BTreeSet::from([root_name.to_string()]),
            frontier: BTreeMap::new(),
        }
    }

    /// Queue every dependency whose name has not been seen yet.
    ///
    /// Must be called with the state lock held for the whole batch: the
    /// first caller to insert a name wins and later ones drop it.
    fn discover(&mut self, deps: BTreeMap<String, String>) -> usize {
        let mut added = 0;
        for (name, specifier) in deps {
            if self.visited.insert(name.clone()) {
                self.frontier.insert(name, specifier);
                added += 1;
            }
        }
        added
    }
}

/// Resolve aliasing and normalize a declared dependency into the
/// `(name, version)` actually requested from the registry.
#[must_use]
pub fn fetch_target(name: &str, specifier: &str) -> (String, String) {
    let (name, specifier) = resolve_alias(name, specifier);
    let version = normalize_specifier(&specifier);
    (name, version)
}

/// Count the distinct package names reachable from `root_name`.
///
/// An `npm:` alias in `root_specifier` replaces the root with its target,
/// which is then what gets counted, deduplicated and reported.
///
/// # Errors
/// Returns [`Error::RootFetch`] if the root manifest cannot be fetched, or
/// [`Error::Task`] if a worker task panics. Failures of any other package are
/// reported through `reporter` and collected in [`CountOutcome::failures`].
pub async fn count_dependencies<S>(
    source: Arc<S>,
    root_name: &str,
    root_specifier: &str,
    options: &CountOptions,
    reporter: Arc<dyn ResolveReporter>,
) -> Result<CountOutcome, Error>
where
    S: ManifestSource + 'static,
{
    // An aliased root is counted and reported as its target
    let (root_name, root_specifier) = resolve_alias(root_name, root_specifier);
    let root_name = root_name.as_str();
    let root_specifier = root_specifier.as_str();

    reporter.fetching(root_name, root_specifier);
    let version = normalize_specifier(root_specifier);
    let root_manifest = source
        .fetch_manifest(root_name, &version)
        .await
        .map_err(|source| Error::RootFetch {
            name: root_name.to_string(),
            version: root_specifier.to_string(),
            source,
        })?;

    let state = Arc::new(Mutex::new(ResolveState::new(root_name)));
    state.lock().await.discover(extract_dependencies(
        &root_manifest,
        options.skip_peer,
        options.skip_optional,
    ));

    let limiter = options
        .max_concurrency
        .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

    let mut failures = Vec::new();
    let mut waves = 0;

    loop {
        let frontier = std::mem::take(&mut state.lock().await.frontier);
        if frontier.is_empty() {
            break;
        }

        waves += 1;
        tracing::debug!(wave = waves, pending = frontier.len(), "starting wave");

        let mut tasks = JoinSet::new();
        for (name, specifier) in frontier {
            let source = Arc::clone(&source);
            let state = Arc::clone(&state);
            let reporter = Arc::clone(&reporter);
            let limiter = limiter.clone();
            let (skip_peer, skip_optional) = (options.skip_peer, options.skip_optional);

            tasks.spawn(async move {
                // Only fails on a closed semaphore
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                visit(
                    source.as_ref(),
                    &state,
                    reporter.as_ref(),
                    name,
                    specifier,
                    skip_peer,
                    skip_optional,
                )
                .await
            });
        }

        // Wave barrier
        while let Some(joined) = tasks.join_next().await {
            if let Some(failure) = joined? {
                failures.push(failure);
            }
        }
    }

    let visited = std::mem::take(&mut state.lock().await.visited);
    let dependency_count = options.root_counting.count(visited.len());
    failures.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        root = root_name,
        dependency_count,
        failed = failures.len(),
        waves,
        "dependency count complete"
    );

    Ok(CountOutcome {
        root_name: root_name.to_string(),
        root_specifier: root_specifier.to_string(),
        dependency_count,
        visited,
        failures,
        waves,
    })
}

/// Fetch one package and queue its unseen dependencies.
async fn visit<S: ManifestSource>(
    source: &S,
    state: &Mutex<ResolveState>,
    reporter: &dyn ResolveReporter,
    name: String,
    specifier: String,
    skip_peer: bool,
    skip_optional: bool,
) -> Option<FailedFetch> {
    reporter.fetching(&name, &specifier);
    let (fetch_name, version) = fetch_target(&name, &specifier);

    match source.fetch_manifest(&fetch_name, &version).await {
        Ok(manifest) => {
            let deps = extract_dependencies(&manifest, skip_peer, skip_optional);
            let added = state.lock().await.discover(deps);
            tracing::trace!(package = %name, version = %version, added, "visited");
            None
        }
        Err(error) => {
            tracing::debug!(
                package = %name,
                specifier = %specifier,
                code = error.code(),
                "{}",
                error.message()
            );
            reporter.fetch_failed(&name, &specifier, &error);
            Some(FailedFetch {
                name,
                specifier,
                error,
            })
        }
    }
}
