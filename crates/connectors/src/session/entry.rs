use model::source::kind::TableKind;
use serde::{Deserialize, Serialize};

/// Metadata of one session table, as listed by [`crate::TableStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    pub kind: TableKind,
    pub row_count: usize,
    pub columns: Vec<String>,
}
