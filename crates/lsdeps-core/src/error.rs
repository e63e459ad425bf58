use crate::pkg::PkgError;
use thiserror::Error;

/// Core error type for lsdeps operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The package being measured could not be fetched, so there is nothing to count.
    #[error("Package {name}@{version} does not exist ({source})")]
    RootFetch {
        name: String,
        version: String,
        #[source]
        source: PkgError,
    },

    #[error("Registry client error: {0}")]
    Registry(#[source] PkgError),

    #[error("Resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
