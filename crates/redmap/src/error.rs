//! Error types for the redmap library.

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use thiserror::Error;

use crate::dictionary::ColumnRole;

/// Main error type for redmap operations.
#[derive(Debug, Error)]
pub enum RedmapError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to import.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A column every dictionary needs could not be located by its pattern.
    #[error("No column matches the '{role}' role")]
    MissingColumn { role: ColumnRole },

    /// A row whose canonical field cannot be built.
    #[error("Invalid field '{field}' at row {row}: {message}")]
    InvalidField {
        row: usize,
        field: String,
        message: String,
    },

    /// Template file could not be decoded into the template model.
    #[error("Malformed template '{path}': {source}")]
    TemplateFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Template decoded but violates a structural rule.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Failure while writing or preparing template storage.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A calculation expression references a variable with no binding.
    #[error("Unbound calculation variable '{{{0}}}'")]
    UnboundVariable(String),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for redmap operations.
pub type Result<T> = std::result::Result<T, RedmapError>;

/// Recoverable failure of a single-cell parser.
///
/// These never abort an import: the importer stores the attribute as absent
/// and forwards the error to its diagnostic sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("'{value}' is not a valid integer: {source}")]
    InvalidInteger {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("'{value}' is not a valid number: {source}")]
    InvalidFloat {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("unrecognized validation type '{0}'")]
    UnknownValidationType(String),
}
