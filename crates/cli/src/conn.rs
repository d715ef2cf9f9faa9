use crate::{commands::UploadSpec, error::CliError};
use connectors::{PgRemoteStore, TableStore, file::csv::loader::load_dataset};
use engine_config::Settings;
use tracing::{error, info, warn};

pub async fn connect_remote(settings: &Settings) -> Result<PgRemoteStore, CliError> {
    let url = settings.database_url()?;
    let store = PgRemoteStore::connect(url).await?;
    info!("Connected to remote store");
    Ok(store)
}

/// Connects and runs the trivial query; used by `test-conn`.
pub async fn ping(settings: &Settings) -> Result<(), CliError> {
    use connectors::RemoteStore;

    let store = connect_remote(settings).await?;
    match store.ping().await {
        Ok(()) => {
            info!("Remote store connection OK");
            Ok(())
        }
        Err(err) => {
            error!("Remote store ping failed: {err}");
            Err(err.into())
        }
    }
}

/// Builds the process-lifetime session store from `--upload` files.
/// A second file mapping to an already registered name is skipped.
pub fn load_session(uploads: &[UploadSpec]) -> Result<TableStore, CliError> {
    let store = TableStore::new()?;
    for spec in uploads {
        let name = spec.table_name();
        if store.exists(&name) {
            warn!(table = %name, path = %spec.path.display(), "Session table already registered, skipping");
            continue;
        }
        let table = load_dataset(&spec.path, spec.kind)?;
        store.register(&table, &name, spec.kind)?;
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::source::kind::TableKind;
    use std::io::Write;

    #[test]
    fn loads_uploads_once_per_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Patient_Number,Day_Number,Physical_activity").unwrap();
        writeln!(file, "1,1,4500").unwrap();
        writeln!(file, "1,2,5200").unwrap();

        let spec = UploadSpec {
            kind: TableKind::Activity,
            path: path.clone(),
        };
        let store = load_session(&[spec.clone(), spec]).unwrap();

        let entries = store.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "steps");
        assert_eq!(entries[0].row_count, 2);
    }

    #[test]
    fn rejects_dataset_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "patient_number,age\n1,40\n").unwrap();

        let err = load_session(&[UploadSpec {
            kind: TableKind::Patients,
            path,
        }])
        .unwrap_err();
        assert!(matches!(err, CliError::File(_)));
    }
}
