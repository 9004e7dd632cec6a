use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across schema loading, the per-format
/// readers, header validation and folder batch assembly. None of these are
/// retried internally: every variant is either a configuration error or
/// missing input data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet reading error.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The schema descriptor file could not be found, even after resolving
    /// relative paths against the configured schema root.
    #[error("schema descriptor not found: {path}")]
    MissingSchema { path: PathBuf },

    /// The schema descriptor parsed but declared no columns.
    #[error("schema descriptor '{path}' defines no columns")]
    EmptySchema { path: PathBuf },

    /// A column declared a type string that does not resolve to any
    /// [`crate::types::ColumnType`].
    #[error("unknown type '{type_name}' for column '{column}'")]
    UnknownColumnType { column: String, type_name: String },

    /// The file extension maps to no supported reader.
    #[error("unsupported format '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Reconciled headers diverge from the schema's expected column set.
    #[error("headers diverge from schema: missing {missing:?}; unexpected {extra:?}")]
    HeaderMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// The folder root does not exist or is not a directory.
    #[error("invalid folder: {path}")]
    InvalidFolder { path: PathBuf },

    /// The folder exists but contains no files at all.
    #[error("no files found in folder: {path}")]
    NoFilesFound { path: PathBuf },

    /// The folder contains files, but none match the configured patterns.
    #[error(
        "no eligible files in {path} (patterns={patterns:?}, normalize_names={normalize_names}, recursive={recursive})"
    )]
    NoEligibleFiles {
        path: PathBuf,
        patterns: Vec<String>,
        normalize_names: bool,
        recursive: bool,
    },

    /// Files matched, but every single read attempt failed or was skipped.
    #[error("no readable files in {path} (patterns={patterns:?}, {failures} failed read(s))")]
    NoReadableFiles {
        path: PathBuf,
        patterns: Vec<String>,
        failures: usize,
    },

    /// Structurally invalid input (wrong top-level JSON/YAML shape, undecodable
    /// text, a workbook without sheets, ...).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl IngestError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
