//! HTTP mapping of service errors.
//!
//! Every rejection becomes a 4xx status with one of the JSON bodies
//! `{error}`, `{error, missing}`, `{error, details}` or `{errors}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::{CsvError, ImportError, StoreError, UploadError, ValidationFailure};
use crate::validation::Location;

pub const MSG_NO_MOVIE_FOR_YEAR: &str = "Niciun film nu a fost găsit după anul specificat";
pub const MSG_NO_MOVIE_FOR_NAME: &str = "Niciun film nu a fost găsit după numele specificat";
pub const MSG_UPDATE_NEEDS_FIELD: &str = "Cel puțin un câmp (title sau year) trebuie trimis";
pub const MSG_BODY_NOT_OBJECT: &str = "Corpul cererii trebuie să fie un obiect JSON";

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Empty search result.
    #[error("{0}")]
    NoResults(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Import(#[from] ImportError),

    /// Export serialization failed.
    #[error("{0}")]
    Csv(#[from] CsvError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound(_)) | ApiError::NoResults(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// JSON body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(ValidationFailure::Fields(errors)) => json!({ "errors": errors }),
            ApiError::Validation(failure @ ValidationFailure::DisallowedFields { location, fields }) => {
                let none: Vec<String> = Vec::new();
                let (body, query) = match location {
                    Location::Body => (fields, &none),
                    Location::Query => (&none, fields),
                };
                json!({
                    "error": failure.to_string(),
                    "details": { "body": body, "query": query },
                })
            }
            ApiError::Upload(err) => upload_body(err),
            ApiError::Import(err @ ImportError::HeaderMismatch { missing }) => json!({
                "error": err.to_string(),
                "missing": missing,
            }),
            ApiError::Import(err @ ImportError::Csv(source)) => json!({
                "error": err.to_string(),
                "details": source.to_string(),
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

fn upload_body(err: &UploadError) -> Value {
    match err {
        UploadError::HeaderMismatch { missing } => json!({
            "error": err.to_string(),
            "missing": missing,
        }),
        UploadError::ParseFailure(source) => json!({
            "error": err.to_string(),
            "details": source.to_string(),
        }),
        _ => json!({ "error": err.to_string() }),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
