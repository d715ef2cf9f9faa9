use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Postgres driver error.
    #[error("PostgreSQL error: {0}")]
    PgError(#[from] tokio_postgres::Error),

    /// DuckDB error (session tables and the federated context).
    #[error("DuckDB error: {0}")]
    DuckDbError(#[from] duckdb::Error),

    /// A table was referenced that the store does not hold.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// A table cannot be materialized (no columns, empty name, ...).
    #[error("Invalid table '{name}': {reason}")]
    InvalidTable { name: String, reason: String },

    /// The store's internal lock was poisoned by a panicking writer.
    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connection URL could not be parsed.
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    /// Establishing the Postgres connection failed.
    #[error("Postgres connection failed: {0}")]
    Connection(#[from] tokio_postgres::Error),

    /// TLS connector could not be built.
    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] native_tls::Error),
}
