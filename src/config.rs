use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_file: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Separated from the environment so it can be driven by a map in tests
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_url = get_or("TASKBOARD_API_URL", "http://localhost:3000/api");
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "TASKBOARD_API_URL",
                reason: format!("'{api_url}' is not an http(s) URL"),
            });
        }
        let api_url = api_url.trim_end_matches('/').to_string();

        let db_path = PathBuf::from(get_or("TASKBOARD_DB_PATH", "taskboard.db"));
        let log_level = get_or("TASKBOARD_LOG_LEVEL", "info");
        let log_file = PathBuf::from(get_or("TASKBOARD_LOG_FILE", "taskboard.log"));

        let timeout_secs: u64 = get_or("TASKBOARD_REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key: "TASKBOARD_REQUEST_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;

        Ok(Config {
            api_url,
            db_path,
            log_level,
            log_file,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.db_path, PathBuf::from("taskboard.db"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config =
            Config::from_lookup(lookup(&[("TASKBOARD_API_URL", "https://tracker.example.com/api/")]))
                .unwrap();
        assert_eq!(config.api_url, "https://tracker.example.com/api");
    }

    #[test]
    fn rejects_non_http_url_and_bad_timeout() {
        assert!(Config::from_lookup(lookup(&[("TASKBOARD_API_URL", "ftp://x")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("TASKBOARD_REQUEST_TIMEOUT_SECS", "soon")])).is_err()
        );
    }
}
