//! Loading of already-cleaned CSV datasets into tables.
//!
//! Header names are normalized (lower case, separators to `_`) and cells are
//! typed per value. No imputation or fuzzy column matching happens here.

use crate::file::csv::error::FileError;
use model::{core::value::Value, records::table::Table, source::kind::TableKind};
use std::{io::Read, path::Path};
use tracing::info;

pub fn normalize_col_name(name: &str) -> String {
    name.trim()
        .replace([' ', '-', '.', '(', ')', ','], "_")
        .to_lowercase()
}

pub fn read_csv<R: Read>(reader: R) -> Result<Table, FileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_col_name).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(FileError::InvalidFormat("missing header row".into()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Value::infer).collect());
    }

    let names: Vec<&str> = headers.iter().map(String::as_str).collect();
    Ok(Table::from_rows(&names, rows))
}

/// Reads a CSV file and checks it carries the required columns of `kind`.
pub fn load_dataset(path: &Path, kind: TableKind) -> Result<Table, FileError> {
    if !path.exists() {
        return Err(FileError::NotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    let table = read_csv(file)?;

    let missing = kind.missing_columns(&table.column_names());
    if !missing.is_empty() {
        return Err(FileError::MissingColumns {
            kind: kind.to_string(),
            missing: missing.join(", "),
        });
    }

    info!(path = %path.display(), %kind, rows = table.row_count(), "Loaded dataset");
    Ok(table)
}
