use connectors::sql::base::error::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FederationError {
    /// The remote store rejected the statement (direct path or fallback).
    #[error("Remote store error: {0}")]
    Remote(#[source] DbError),

    /// The in-process analytical context could not be created or queried.
    #[error("Analytical engine error: {0}")]
    Engine(#[source] DbError),

    /// A combined canonical table could not be registered in the context.
    #[error("Failed to register '{table}': {source}")]
    Registration {
        table: String,
        #[source]
        source: DbError,
    },
}
