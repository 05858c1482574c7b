//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary) and can be overridden by command-line flags.
//!
//! | Variable                        | Default   |
//! |---------------------------------|-----------|
//! | `MOVIES_PORT`                   | `3000`    |
//! | `MOVIES_MAX_UPLOAD_BYTES`       | `2097152` |
//! | `MOVIES_FORBID_UNKNOWN_FIELDS`  | `false`   |
//! | `MOVIES_SEED`                   | `true`    |

use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Largest accepted CSV upload, in bytes.
    pub max_upload_bytes: usize,
    /// Reject `POST /movies/add` bodies with keys other than `title` and `year`.
    pub forbid_unknown_fields: bool,
    /// Start with the ten seed movies.
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            forbid_unknown_fields: false,
            seed: true,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unparsable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            port: lookup("MOVIES_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: lookup("MOVIES_MAX_UPLOAD_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            forbid_unknown_fields: lookup("MOVIES_FORBID_UNKNOWN_FIELDS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.forbid_unknown_fields),
            seed: lookup("MOVIES_SEED")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("MOVIES_PORT", "8080"),
            ("MOVIES_MAX_UPLOAD_BYTES", "1024"),
            ("MOVIES_FORBID_UNKNOWN_FIELDS", "yes"),
            ("MOVIES_SEED", "0"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.forbid_unknown_fields);
        assert!(!config.seed);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("MOVIES_PORT", "not-a-port"),
            ("MOVIES_SEED", "maybe"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.seed);
    }
}
