use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
    #[error("Dataset is not a valid {kind} table, missing columns: {missing}")]
    MissingColumns { kind: String, missing: String },
}
