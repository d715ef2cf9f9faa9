use agent::LlmError;
use connectors::{
    file::csv::error::FileError,
    sql::base::error::{ConnectorError, DbError},
};
use engine_config::SettingsError;
use federation::error::FederationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to connect to the remote store: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Failed to load dataset: {0}")]
    File(#[from] FileError),

    #[error("Query failed: {0}")]
    Federation(#[from] FederationError),

    #[error("Failed to set up the LLM client: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// `--upload` argument not of the form `kind:path`.
    #[error("Invalid upload specification: {0}")]
    InvalidUpload(String),

    /// The pipeline ended in a `Failure` outcome.
    #[error("Analysis failed: {0}")]
    Pipeline(String),
}
