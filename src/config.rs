// src/config.rs

use std::env;
use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;
use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3055";
pub const DEFAULT_PORT: u16 = 3056;
pub const DEFAULT_TEST_DURATION_SECS: u32 = 3600;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    /// Browser origin allowed to call the API.
    pub allowed_origin: HeaderValue,
    pub port: u16,
    pub test_duration_secs: u32,
    pub max_upload_bytes: usize,
    pub extraction_timeout_secs: u64,
    pub rust_log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Defaults for everything but the credential.
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
            port: DEFAULT_PORT,
            test_duration_secs: DEFAULT_TEST_DURATION_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            extraction_timeout_secs: DEFAULT_EXTRACTION_TIMEOUT_SECS,
            rust_log: "info".to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key-value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let mut config = Self::new(gemini_api_key);

        if let Some(model) = lookup("GEMINI_MODEL") {
            config.gemini_model = model;
        }

        if let Some(base) = lookup("GEMINI_API_BASE") {
            Url::parse(&base).map_err(|_| ConfigError::Invalid {
                key: "GEMINI_API_BASE",
                value: base.clone(),
            })?;
            config.gemini_api_base = base;
        }

        if let Some(origin) = lookup("ALLOWED_ORIGIN") {
            config.allowed_origin =
                HeaderValue::from_str(&origin).map_err(|_| ConfigError::Invalid {
                    key: "ALLOWED_ORIGIN",
                    value: origin.clone(),
                })?;
        }

        config.port = parse_var(&lookup, "PORT", config.port)?;
        config.test_duration_secs =
            parse_var(&lookup, "TEST_DURATION_SECS", config.test_duration_secs)?;
        if config.test_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "TEST_DURATION_SECS",
                value: "0".to_string(),
            });
        }
        config.max_upload_bytes = parse_var(&lookup, "MAX_UPLOAD_BYTES", config.max_upload_bytes)?;
        config.extraction_timeout_secs =
            parse_var(&lookup, "EXTRACTION_TIMEOUT_SECS", config.extraction_timeout_secs)?;

        if let Some(rust_log) = lookup("RUST_LOG") {
            config.rust_log = rust_log;
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.gemini_api_key, "secret");
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.port, 3056);
        assert_eq!(config.allowed_origin, "http://localhost:3055");
        assert_eq!(config.test_duration_secs, 3600);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GEMINI_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PORT", "8080"),
            ("TEST_DURATION_SECS", "900"),
            ("ALLOWED_ORIGIN", "https://quiz.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.port, 8080);
        assert_eq!(config.test_duration_secs, 900);
        assert_eq!(config.allowed_origin, "https://quiz.example.com");
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "not-a-port".to_string()
            }
        );

        assert!(
            Config::from_lookup(lookup_from(&[
                ("GEMINI_API_KEY", "secret"),
                ("TEST_DURATION_SECS", "0"),
            ]))
            .is_err()
        );
        assert!(
            Config::from_lookup(lookup_from(&[
                ("GEMINI_API_KEY", "secret"),
                ("GEMINI_API_BASE", "not a url"),
            ]))
            .is_err()
        );
    }
}
