use crate::sql::{
    base::{
        error::{ConnectorError, DbError},
        remote::RemoteStore,
        row::DbRow,
    },
    postgres::utils::connect_client,
};
use async_trait::async_trait;
use model::{
    core::data_type::DataType,
    records::table::{Column, Table},
};
use std::sync::Arc;
use tokio_postgres::Client;
use tracing::{debug, warn};

/// `RemoteStore` over a single persistent Postgres connection.
#[derive(Clone)]
pub struct PgRemoteStore {
    client: Arc<Client>,
}

impl PgRemoteStore {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(PgRemoteStore {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn execute(&self, sql: &str) -> Result<Table, DbError> {
        debug!(sql, "Executing against remote store");

        // Prepare first so that column metadata survives empty results.
        let statement = self.client.prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|col| {
                let data_type = DataType::from_postgres_type(col.type_().name()).unwrap_or_else(|_| {
                    warn!(column = col.name(), type_name = col.type_().name(), "Unmapped column type");
                    DataType::String
                });
                Column::new(col.name(), data_type)
            })
            .collect();

        let rows = self.client.query(&statement, &[]).await?;
        let values = rows
            .iter()
            .map(|row| DbRow::PostgresRow(row).to_values())
            .collect();

        Ok(Table::new(columns, values))
    }
}
