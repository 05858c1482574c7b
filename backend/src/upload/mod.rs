//! File-level checks for CSV uploads.
//!
//! Runs before any data row is parsed, in a fixed order: presence, extension,
//! MIME type, size, header columns. The first failure aborts.

use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};
use crate::parser::{decode_content, missing_columns, read_header};

/// Default maximum upload size (2 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// An uploaded file as received from the multipart body.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Limits applied by [`check_upload`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadLimits {
    pub max_size: usize,
    pub expected_headers: Vec<String>,
}

impl UploadLimits {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_UPLOAD_BYTES,
            expected_headers: vec!["title".to_string(), "year".to_string()],
        }
    }
}

/// Check an upload and return its normalized header row.
pub fn check_upload(file: Option<&UploadedFile>, limits: &UploadLimits) -> UploadResult<Vec<String>> {
    let file = file.ok_or(UploadError::MissingFile)?;

    let has_csv_extension = file
        .file_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().ends_with(".csv"));
    if !has_csv_extension {
        return Err(UploadError::BadExtension);
    }

    if let Some(mime) = file.content_type.as_deref() {
        if !mime.contains("csv") && !mime.contains("text") {
            return Err(UploadError::BadMimeType(mime.to_string()));
        }
    }

    if file.size() > limits.max_size {
        return Err(UploadError::FileTooLarge {
            size: file.size(),
            max: limits.max_size,
        });
    }

    let (content, _) = decode_content(&file.bytes);
    let header = read_header(&content).map_err(UploadError::ParseFailure)?;

    let missing = missing_columns(&header, &limits.expected_headers);
    if !missing.is_empty() {
        return Err(UploadError::HeaderMismatch { missing });
    }

    Ok(header)
}
