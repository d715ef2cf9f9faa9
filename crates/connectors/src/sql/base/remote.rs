use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::records::table::Table;

/// Durable relational store exposing the canonical `patients` and `activity` tables.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Runs one SQL statement and returns its rows.
    async fn execute(&self, sql: &str) -> Result<Table, DbError>;

    /// Succeeds when the store answers a trivial query with one row.
    async fn ping(&self) -> Result<(), DbError> {
        let result = self.execute("SELECT 1 AS test").await?;
        if result.is_empty() {
            return Err(DbError::Unknown("connection test returned no rows".into()));
        }
        Ok(())
    }
}
