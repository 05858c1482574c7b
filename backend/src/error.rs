//! Error types for the movies service.
//!
//! This module defines the error hierarchy shared by the core and the HTTP layer:
//!
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`FieldError`] / [`ValidationFailure`] - schema validation results
//! - [`StoreError`] - record store lookups
//! - [`UploadError`] - file-level checks run before an import
//! - [`ImportError`] - whole-batch import aborts
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Display strings of the
//! user-facing variants are the Romanian messages returned by the API.

use serde::Serialize;
use thiserror::Error;

use crate::validation::Location;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV decoding, parsing and writing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file (no header row).
    #[error("CSV file is empty")]
    EmptyFile,

    /// Failed to serialize records.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Category of a single field failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    /// Required field absent.
    MissingField,
    /// Present but of the wrong shape.
    InvalidType,
    /// String length outside bounds.
    InvalidLength,
    /// Range, pattern or custom predicate failure.
    InvalidValue,
}

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub location: Location,
    #[serde(skip)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        location: Location,
        kind: FieldErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            location,
            kind,
        }
    }
}

/// Outcome of a rejected payload.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationFailure {
    /// Every failed check of every field, in schema order.
    #[error("Validation failed: {}", join_messages(.0))]
    Fields(Vec<FieldError>),

    /// Keys outside the schema while unknown keys are forbidden.
    #[error("Request conține câmpuri nepermise")]
    DisallowedFields { location: Location, fields: Vec<String> },
}

impl ValidationFailure {
    /// Messages of all field errors (empty for disallowed-field failures).
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationFailure::Fields(errors) => {
                errors.iter().map(|e| e.message.clone()).collect()
            }
            ValidationFailure::DisallowedFields { .. } => Vec::new(),
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    #[error("Filmul nu a fost găsit")]
    NotFound(u64),
}

// =============================================================================
// Upload Errors
// =============================================================================

/// File-level rejections, checked in declaration order before any row is read.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Fișier lipsă. Trimiteți un fișier CSV sub câmpul \"file\".")]
    MissingFile,

    #[error("Fișierul trebuie să aibă extensia .csv")]
    BadExtension,

    #[error("Tip MIME neacceptat: {0}. Așteptat text/csv")]
    BadMimeType(String),

    #[error("Fișier prea mare. Maxim {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    #[error("Header-ele CSV nu corespund DTO-ului")]
    HeaderMismatch { missing: Vec<String> },

    #[error("Eroare la parsarea fișierului CSV")]
    ParseFailure(#[source] CsvError),
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors that abort a whole import. Row failures never do.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Required columns absent from the header row.
    #[error("Header-ele CSV nu corespund DTO-ului")]
    HeaderMismatch { missing: Vec<String> },

    /// The body could not be parsed as CSV.
    #[error("Eroare la parsarea fișierului CSV")]
    Csv(#[from] CsvError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationFailure>;

/// Result type for upload checks.
pub type UploadResult<T> = Result<T, UploadError>;

/// Result type for imports.
pub type ImportResult<T> = Result<T, ImportError>;
