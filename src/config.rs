use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::controller::DEFAULT_SESSION_TTL;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::schema::ScorePolicy;
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set (e.g. in a .env file)")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub bind: SocketAddr,
    pub storage_url: Option<String>,
    pub max_upload_bytes: usize,
    pub score_policy: ScorePolicy,
    pub session_ttl: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("bind", &self.bind)
            .field("storage_url", &self.storage_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("score_policy", &self.score_policy)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let bind = get("AESTHETICA_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "AESTHETICA_BIND",
                reason: e.to_string(),
            })?;

        let max_upload_bytes = match get("AESTHETICA_MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "AESTHETICA_MAX_UPLOAD_BYTES",
                    reason: format!("`{raw}` is not a positive byte count"),
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let score_policy = match get("AESTHETICA_SCORE_POLICY") {
            Some(raw) => raw.parse::<ScorePolicy>().map_err(|reason| ConfigError::Invalid {
                name: "AESTHETICA_SCORE_POLICY",
                reason,
            })?,
            None => ScorePolicy::default(),
        };

        let session_ttl = match get("AESTHETICA_SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "AESTHETICA_SESSION_TTL_SECS",
                    reason: format!("`{raw}` is not a positive number of seconds"),
                })?,
            None => DEFAULT_SESSION_TTL,
        };

        Ok(Self {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind,
            storage_url: get("AESTHETICA_STORAGE_URL"),
            max_upload_bytes,
            score_policy,
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn api_key_is_required() {
        assert_eq!(
            from(&[]).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
        assert_eq!(
            from(&[("GEMINI_API_KEY", "  ")]).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
    }

    #[test]
    fn defaults_apply() {
        let config = from(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.storage_url, None);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.score_policy, ScorePolicy::Clamp);
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
    }

    #[test]
    fn overrides_are_read() {
        let config = from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("AESTHETICA_BIND", "127.0.0.1:8080"),
            ("AESTHETICA_STORAGE_URL", "http://localhost/upload.php"),
            ("AESTHETICA_MAX_UPLOAD_BYTES", "1024"),
            ("AESTHETICA_SCORE_POLICY", "reject"),
            ("AESTHETICA_SESSION_TTL_SECS", "600"),
        ])
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.storage_url.as_deref(),
            Some("http://localhost/upload.php")
        );
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.score_policy, ScorePolicy::Reject);
        assert_eq!(config.session_ttl, Duration::from_secs(600));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = from(&[("GEMINI_API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = from(&[("GEMINI_API_KEY", "k"), ("AESTHETICA_MAX_UPLOAD_BYTES", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AESTHETICA_MAX_UPLOAD_BYTES", .. }));

        let err = from(&[("GEMINI_API_KEY", "k"), ("AESTHETICA_BIND", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AESTHETICA_BIND", .. }));

        let err = from(&[("GEMINI_API_KEY", "k"), ("AESTHETICA_SESSION_TTL_SECS", "-5")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AESTHETICA_SESSION_TTL_SECS", .. }));
    }
}
