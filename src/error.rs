use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort loading a dataset.
///
/// Per-cell parse failures are not errors: they coerce to `None` inside the
/// loader and never reach this type.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened or its metadata read.
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a known loader.
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// One or more required columns are absent from the header/schema.
    #[error("{path} is missing required columns: {}", missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed, but its top level is not an array of records.
    #[error("Expected a top-level JSON array of records")]
    JsonShape,

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Errors raised while reading a [`crate::config::DashboardConfig`] file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_name() {
        let err = LoadError::MissingColumns {
            path: PathBuf::from("users.csv"),
            missing: vec!["Signup_Date".to_string(), "Last_Login".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "users.csv is missing required columns: Signup_Date, Last_Login"
        );
    }

    #[test]
    fn unreadable_mentions_path_and_cause() {
        let err = LoadError::Unreadable {
            path: PathBuf::from("/nope/users.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/users.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn unsupported_format_display() {
        let err = LoadError::UnsupportedFormat("xlsx".to_string());
        assert_eq!(err.to_string(), "Unsupported file extension: .xlsx");
    }
}
