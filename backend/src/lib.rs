//! # Movies - in-memory movie catalogue over HTTP
//!
//! A small REST service keeping a list of movies in memory, with declarative
//! request validation and bulk CSV import/export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Request   │────▶│ Validation  │────▶│   Handler   │────▶│ MovieStore  │
//! │ (JSON/query)│     │  (schemas)  │     │   (axum)    │     │  (RwLock)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV Upload │────▶│ Gatekeeper  │────▶│   Parser    │────▶│  Importer   │
//! │ (multipart) │     │ (ext/size)  │     │  (auto-enc) │     │ (row checks)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use movies::{import_csv, export_csv, MovieFilter, MovieStore};
//!
//! let mut store = MovieStore::new();
//! let report = import_csv(&mut store, b"title,year\nHeat,1995\nX,abc\n").unwrap();
//! assert_eq!(report.successful, 1);
//! assert_eq!(report.failed, 1);
//!
//! let csv = export_csv(store.list(), &MovieFilter::default()).unwrap();
//! assert_eq!(csv, "id,title,year\n1,\"Heat\",1995");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Movie record, patch and filter
//! - [`store`] - In-memory movie store
//! - [`validation`] - Declarative field validation and the request schemas
//! - [`parser`] - CSV parsing with encoding detection
//! - [`upload`] - Upload gatekeeper
//! - [`import`] - Row-by-row CSV import
//! - [`export`] - CSV export
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;
pub mod store;

// Validation
pub mod validation;

// CSV
pub mod export;
pub mod import;
pub mod parser;
pub mod upload;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ServerConfig;

pub use error::{
    CsvError, FieldError, FieldErrorKind, ImportError, StoreError, UploadError,
    ValidationFailure,
};

pub use models::{Movie, MovieFilter, MoviePatch};

pub use store::{MovieStore, SharedStore};

pub use validation::{validate, Location, Schema, ValidationOptions};

pub use parser::{decode_content, detect_encoding, parse_bytes, parse_csv_file, ParsedCsv};

pub use upload::{check_upload, UploadLimits, UploadedFile};

pub use import::{import_csv, ImportReport, RowError};

pub use export::export_csv;

pub use api::{ApiError, AppState};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
