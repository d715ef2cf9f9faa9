#![allow(dead_code)]

use connectors::{TableStore, file::csv::loader::load_dataset};
use model::source::kind::TableKind;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub mod utils;

/// Columns of the canonical `patients` table, in seed order.
const PATIENT_COLUMNS: &str = "patient_number,age,bmi,sex,smoking,chronic_kidney_disease,\
adrenal_and_thyroid_disorders,blood_pressure_abnormality,level_of_stress";

/// Writes a CSV dataset into `dir` and returns its path.
pub fn write_csv(dir: &Path, file_name: &str, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(file_name);
    let mut content = format!("{header}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).expect("write csv");
    path
}

/// A cleaned patients upload with `ids.len()` rows, none with kidney disease.
pub fn patients_csv(dir: &Path, file_name: &str, ids: &[i64]) -> PathBuf {
    let rows: Vec<String> = ids
        .iter()
        .map(|id| format!("{id},40,24.5,1,0,0,0,0,2"))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    write_csv(dir, file_name, PATIENT_COLUMNS, &rows)
}

/// Loads and registers an uploaded dataset the way the ingestion side does.
pub fn register_upload(store: &TableStore, path: &Path, name: &str, kind: TableKind) {
    let table = load_dataset(path, kind).expect("load dataset");
    store.register(&table, name, kind).expect("register upload");
}

pub fn empty_session() -> Arc<TableStore> {
    Arc::new(TableStore::new().expect("session store"))
}
