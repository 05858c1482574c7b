//! REST API types: shared handler state and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::models::Movie;
use crate::store::{MovieStore, SharedStore};
use crate::upload::UploadLimits;
use crate::validation::ValidationOptions;

pub const MSG_MOVIE_UPDATED: &str = "Filmul a fost actualizat";
pub const MSG_MOVIE_DELETED: &str = "Filmul a fost șters";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Unknown-key policy for `POST /movies/add`.
    pub create_options: ValidationOptions,
    pub upload_limits: UploadLimits,
}

impl AppState {
    pub fn new(store: MovieStore) -> Self {
        Self {
            store: store.into_shared(),
            create_options: ValidationOptions::default(),
            upload_limits: UploadLimits::default(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let store = if config.seed {
            MovieStore::seeded()
        } else {
            MovieStore::new()
        };
        let create_options = if config.forbid_unknown_fields {
            ValidationOptions::forbid_unknown()
        } else {
            ValidationOptions::whitelist()
        };
        Self {
            store: store.into_shared(),
            create_options,
            upload_limits: UploadLimits::default().with_max_size(config.max_upload_bytes),
        }
    }

    pub fn with_create_options(mut self, options: ValidationOptions) -> Self {
        self.create_options = options;
        self
    }
}

/// Body of update and delete responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieChange {
    pub message: String,
    pub film: Movie,
}

impl MovieChange {
    pub fn updated(film: Movie) -> Self {
        Self {
            message: MSG_MOVIE_UPDATED.to_string(),
            film,
        }
    }

    pub fn deleted(film: Movie) -> Self {
        Self {
            message: MSG_MOVIE_DELETED.to_string(),
            film,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}
