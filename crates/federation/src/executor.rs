use crate::error::FederationError;
use async_trait::async_trait;
use model::records::table::Table;

/// Runs SQL written against the canonical tables, wherever their rows live.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str, include_uploaded: bool) -> Result<Table, FederationError>;
}
