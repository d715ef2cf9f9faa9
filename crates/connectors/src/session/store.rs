//! Session-scoped store of uploaded tables.
//!
//! One `TableStore` belongs to one session. It is the only mutable shared
//! state of the query core: tables enter through [`TableStore::register`] and
//! leave through [`TableStore::remove`] or [`TableStore::clear`]. Readers
//! (the federator, the pipeline) only query or fetch.

use crate::{
    session::entry::TableEntry,
    sql::{analytic::context::AnalyticContext, base::error::DbError},
};
use model::{records::table::Table, source::kind::TableKind};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct TableStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    context: AnalyticContext,
    // Registration order is significant for federation.
    entries: Vec<TableEntry>,
}

impl TableStore {
    pub fn new() -> Result<Self, DbError> {
        Ok(TableStore {
            inner: Mutex::new(StoreState {
                context: AnalyticContext::in_memory()?,
                entries: Vec::new(),
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, DbError> {
        self.inner
            .lock()
            .map_err(|_| DbError::LockError("table store lock poisoned".into()))
    }

    /// Creates (or transparently replaces) the table `name` from an already
    /// validated dataset. Callers check [`TableStore::exists`] first when they
    /// want register-once semantics.
    pub fn register(&self, table: &Table, name: &str, kind: TableKind) -> Result<(), DbError> {
        let mut state = self.lock()?;
        state.context.register(name, table)?;

        let entry = TableEntry {
            name: name.to_string(),
            kind,
            row_count: table.row_count(),
            columns: table.column_names(),
        };
        match state.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                warn!(table = name, "Replacing existing session table");
                *existing = entry;
            }
            None => state.entries.push(entry),
        }

        info!(table = name, %kind, rows = table.row_count(), "Registered session table");
        Ok(())
    }

    /// Runs SQL against the session tables.
    pub fn query(&self, sql: &str) -> Result<Table, DbError> {
        let state = self.lock()?;
        state.context.query(sql)
    }

    /// Full contents of one registered table.
    pub fn fetch(&self, name: &str) -> Result<Table, DbError> {
        let state = self.lock()?;
        if !state.entries.iter().any(|e| e.name == name) {
            return Err(DbError::UnknownTable(name.to_string()));
        }
        state.context.fetch(name)
    }

    /// Returns `false` when no table of that name was registered.
    pub fn remove(&self, name: &str) -> Result<bool, DbError> {
        let mut state = self.lock()?;
        let Some(pos) = state.entries.iter().position(|e| e.name == name) else {
            return Ok(false);
        };
        state.context.drop_table(name)?;
        state.entries.remove(pos);
        debug!(table = name, "Removed session table");
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), DbError> {
        let mut state = self.lock()?;
        let names: Vec<String> = state.entries.iter().map(|e| e.name.clone()).collect();
        for name in &names {
            state.context.drop_table(name)?;
        }
        state.entries.clear();
        debug!(count = names.len(), "Cleared session tables");
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lock()
            .map(|state| state.entries.iter().any(|e| e.name == name))
            .unwrap_or(false)
    }

    /// All entries in registration order.
    pub fn list(&self) -> Vec<TableEntry> {
        self.lock()
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    /// Names of the entries of `kind`, in registration order.
    pub fn entries_of_kind(&self, kind: TableKind) -> Vec<String> {
        self.list()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }
}
