use crate::error::CliError;
use clap::{Args, Subcommand};
use model::source::kind::TableKind;
use std::{path::PathBuf, str::FromStr};

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a natural-language question about the health records
    Ask {
        /// The question, e.g. "What is the average BMI of smokers?"
        question: String,

        #[command(flatten)]
        uploads: UploadArgs,

        #[arg(long, help = "Union uploaded tables with the remote tables")]
        include_uploaded: bool,

        #[arg(long, help = "Print the outcome as JSON instead of text")]
        json: bool,
    },
    /// Run one SQL statement against the canonical tables
    Query {
        sql: String,

        #[command(flatten)]
        uploads: UploadArgs,

        #[arg(long, help = "Union uploaded tables with the remote tables")]
        include_uploaded: bool,

        #[arg(long, help = "Print the rows as JSON records instead of a table")]
        json: bool,
    },
    /// List the session tables created from --upload files
    Sources {
        #[command(flatten)]
        uploads: UploadArgs,
    },
    /// Check that the remote store answers
    TestConn,
}

#[derive(Args, Default)]
pub struct UploadArgs {
    /// Cleaned CSV dataset to register for this session, as `patients:<path>`
    /// or `activity:<path>`; repeatable
    #[arg(long = "upload", value_name = "KIND:PATH")]
    pub specs: Vec<UploadSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadSpec {
    pub kind: TableKind,
    pub path: PathBuf,
}

impl UploadSpec {
    /// Session table name: the file stem, reduced to `[a-z0-9_]`.
    pub fn table_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let name: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("upload_{name}")
        } else {
            name
        }
    }
}

impl FromStr for UploadSpec {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, path) = s
            .split_once(':')
            .ok_or_else(|| CliError::InvalidUpload(format!("{s} (expected KIND:PATH)")))?;
        let kind = TableKind::from_str(kind.trim())
            .map_err(|_| CliError::InvalidUpload(format!("unknown table kind '{kind}'")))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(CliError::InvalidUpload(format!("{s} (empty path)")));
        }
        Ok(UploadSpec {
            kind,
            path: PathBuf::from(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_spec() {
        let spec: UploadSpec = "patients:data/clinic-a.csv".parse().unwrap();
        assert_eq!(spec.kind, TableKind::Patients);
        assert_eq!(spec.path, PathBuf::from("data/clinic-a.csv"));
        assert_eq!(spec.table_name(), "clinic_a");
    }

    #[test]
    fn rejects_bad_specs() {
        assert!("patients".parse::<UploadSpec>().is_err());
        assert!("visits:x.csv".parse::<UploadSpec>().is_err());
        assert!("activity:".parse::<UploadSpec>().is_err());
    }

    #[test]
    fn numeric_stems_get_prefix() {
        let spec: UploadSpec = "activity:2024.csv".parse().unwrap();
        assert_eq!(spec.table_name(), "upload_2024");
    }
}
