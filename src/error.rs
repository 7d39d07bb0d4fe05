//! Error types for the property admin pipeline

use thiserror::Error;

use crate::models::permissions::Capability;

/// Structural CSV failures. Any of these aborts an import before a single row
/// is processed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("the CSV file is empty: expected a header line and at least one data row")]
    EmptyFile,

    #[error("missing required headers: {}", .0.join(", "))]
    MissingRequiredHeaders(Vec<String>),

    #[error("invalid headers: {}", .0.join(", "))]
    InvalidHeaders(Vec<String>),

    #[error("malformed CSV near line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl CsvError {
    /// Stable machine-readable code for the failure
    pub fn code(&self) -> &'static str {
        match self {
            CsvError::EmptyFile => "EMPTY_FILE",
            CsvError::MissingRequiredHeaders(_) => "MISSING_REQUIRED_HEADERS",
            CsvError::InvalidHeaders(_) => "INVALID_HEADERS",
            CsvError::Malformed { .. } => "MALFORMED_CSV",
        }
    }
}

/// Failures talking to the WordPress REST API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("site configuration is missing: {0} is not set")]
    MissingConfig(&'static str),

    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server rejected the request as a duplicate record
    /// (e.g. a patent or title that already exists)
    pub fn is_duplicate(&self) -> bool {
        match self {
            ApiError::Http { status, message } => {
                let message = message.to_lowercase();
                *status == 409
                    || message.contains("duplicate")
                    || message.contains("already exists")
                    || message.contains("duplicad")
                    || message.contains("ya existe")
            }
            _ => false,
        }
    }
}

/// Store-level failures surfaced once at the UI boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("permission denied: the current role cannot {0}")]
    Forbidden(Capability),

    #[error("property {0} is not loaded")]
    NotFound(i64),

    #[error("no properties selected")]
    EmptySelection,

    #[error("invalid property: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Fatal import failures: the import returns to file selection
#[derive(Debug, Error)]
pub enum ImportAbort {
    #[error("no file selected for import")]
    NoFile,

    #[error("an import is already running")]
    AlreadyRunning,

    #[error("cannot read import file: {0}")]
    Read(#[from] std::io::Error),

    #[error("{code}: {0}", code = .0.code())]
    Csv(#[from] CsvError),

    #[error("permission denied: the current role cannot {0}")]
    Forbidden(Capability),
}

/// A status string outside the fixed enumeration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status '{0}': expected one of available, sold, rented, reserved")]
pub struct InvalidStatus(pub String);
