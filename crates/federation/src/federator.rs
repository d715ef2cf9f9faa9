//! Federated execution of one SQL statement across the remote store and the
//! session's uploaded tables.
//!
//! Callers write SQL against the canonical `patients` / `activity` tables.
//! When uploaded data is requested and present, the federator pulls every
//! contributing source of each referenced canonical table, stacks them into
//! one table per canonical name inside a fresh in-memory DuckDB context and
//! runs the unchanged statement there. Any failure on that path falls back to
//! running the statement on the remote store alone.

use crate::{error::FederationError, executor::QueryExecutor, references::referenced_tables};
use async_trait::async_trait;
use connectors::{
    session::store::TableStore,
    sql::{analytic::context::AnalyticContext, base::remote::RemoteStore},
};
use model::{records::table::Table, source::kind::TableKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rows fetched from the remote store per canonical table during federation.
pub const DEFAULT_ROW_CAP: usize = 20_000;

/// Which route produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Remote store only; federation not requested or nothing uploaded.
    Direct,
    /// Combined remote and session rows in the analytical context.
    Federated,
    /// Federation failed and the remote store answered instead.
    Fallback,
}

pub struct QueryFederator {
    remote: Arc<dyn RemoteStore>,
    session: Arc<TableStore>,
    row_cap: usize,
}

impl QueryFederator {
    pub fn new(remote: Arc<dyn RemoteStore>, session: Arc<TableStore>) -> Self {
        QueryFederator {
            remote,
            session,
            row_cap: DEFAULT_ROW_CAP,
        }
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = row_cap;
        self
    }

    pub fn has_uploaded_sources(&self) -> bool {
        !self.session.is_empty()
    }

    /// Like [`QueryExecutor::execute`], also reporting the route taken.
    pub async fn execute_traced(
        &self,
        sql: &str,
        include_uploaded: bool,
    ) -> Result<(Table, ExecutionPath), FederationError> {
        if !include_uploaded || !self.has_uploaded_sources() {
            let table = self.execute_remote(sql).await?;
            return Ok((table, ExecutionPath::Direct));
        }

        match self.federate(sql).await {
            Ok(table) => {
                info!(rows = table.row_count(), "Federated query succeeded");
                Ok((table, ExecutionPath::Federated))
            }
            Err(error) => {
                warn!(%error, "Federated execution failed, falling back to remote store");
                let table = self.execute_remote(sql).await?;
                Ok((table, ExecutionPath::Fallback))
            }
        }
    }

    async fn execute_remote(&self, sql: &str) -> Result<Table, FederationError> {
        self.remote.execute(sql).await.map_err(FederationError::Remote)
    }

    async fn federate(&self, sql: &str) -> Result<Table, FederationError> {
        let needed = referenced_tables(sql);
        debug!(?needed, "Canonical tables referenced");

        let mut combined = Vec::with_capacity(needed.len());
        for kind in needed {
            combined.push((kind, self.gather(kind).await));
        }

        // No awaits past this point: the context never crosses a suspension.
        let mut context = AnalyticContext::in_memory().map_err(FederationError::Engine)?;
        for (kind, table) in &combined {
            if table.columns().is_empty() {
                debug!(table = kind.canonical_name(), "No source contributed rows");
                continue;
            }
            context
                .register(kind.canonical_name(), table)
                .map_err(|source| FederationError::Registration {
                    table: kind.canonical_name().to_string(),
                    source,
                })?;
        }

        context.query(sql).map_err(FederationError::Engine)
    }

    /// Remote rows first (capped), then every session table of the same kind in
    /// registration order. Failing sources are logged and contribute nothing.
    async fn gather(&self, kind: TableKind) -> Table {
        let canonical = kind.canonical_name();
        let mut parts = Vec::new();

        let fetch = format!("SELECT * FROM {canonical} LIMIT {}", self.row_cap);
        match self.remote.execute(&fetch).await {
            Ok(mut table) => {
                table.truncate(self.row_cap);
                debug!(table = canonical, rows = table.row_count(), "Fetched remote rows");
                if !table.is_empty() {
                    parts.push(table);
                }
            }
            Err(error) => warn!(table = canonical, %error, "Remote fetch failed, using no remote rows"),
        }

        for name in self.session.entries_of_kind(kind) {
            match self.session.fetch(&name) {
                Ok(table) if !table.is_empty() => {
                    debug!(table = %name, rows = table.row_count(), "Fetched session rows");
                    parts.push(table);
                }
                Ok(_) => {}
                Err(error) => warn!(table = %name, %error, "Session table fetch failed, skipping"),
            }
        }

        Table::concat(parts)
    }
}

#[async_trait]
impl QueryExecutor for QueryFederator {
    async fn execute(&self, sql: &str, include_uploaded: bool) -> Result<Table, FederationError> {
        self.execute_traced(sql, include_uploaded)
            .await
            .map(|(table, _)| table)
    }
}
