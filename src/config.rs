use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_MANAGER_URL: &str = "http://manager:5000";
pub const DEFAULT_MANAGER_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 5000;

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the identity provider; required for authenticated search.
    pub identity_url: Option<String>,
    /// Server key sent as `apikey` to the identity provider.
    pub identity_key: Option<String>,
    pub identity_timeout: Duration,
    pub manager_url: String,
    pub manager_timeout: Duration,
    pub bind_addr: String,
    pub static_dir: String,
    /// When unset, search logging is disabled.
    pub mongo_uri: Option<String>,
    pub mongo_db_name: String,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok(); // Load .env file if present
        Ok(Config {
            identity_url: get_env_opt("IDENTITY_URL").map(|url| trim_base_url(&url)),
            identity_key: get_env_opt("IDENTITY_KEY"),
            identity_timeout: get_millis_or_default(
                "IDENTITY_TIMEOUT_MS",
                DEFAULT_IDENTITY_TIMEOUT_MS,
            )?,
            manager_url: trim_base_url(&get_env_or_default("MANAGER_URL", DEFAULT_MANAGER_URL)),
            manager_timeout: get_millis_or_default(
                "MANAGER_TIMEOUT_MS",
                DEFAULT_MANAGER_TIMEOUT_MS,
            )?,
            bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:3000"),
            static_dir: get_env_or_default("STATIC_DIR", "static"),
            mongo_uri: get_env_opt("MONGO_URI"),
            mongo_db_name: get_env_or_default("MONGO_DB_NAME", "searchgate"),
        })
    }

    /// Returns the identity-provider endpoint and key, or names what is missing.
    pub fn identity(&self) -> Result<(&str, &str), &'static str> {
        match (self.identity_url.as_deref(), self.identity_key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            (None, Some(_)) => Err("IDENTITY_URL"),
            (Some(_), None) => Err("IDENTITY_KEY"),
            (None, None) => Err("IDENTITY_URL and IDENTITY_KEY"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            identity_url: None,
            identity_key: None,
            identity_timeout: Duration::from_millis(DEFAULT_IDENTITY_TIMEOUT_MS),
            manager_url: DEFAULT_MANAGER_URL.to_string(),
            manager_timeout: Duration::from_millis(DEFAULT_MANAGER_TIMEOUT_MS),
            bind_addr: "0.0.0.0:3000".to_string(),
            static_dir: "static".to_string(),
            mongo_uri: None,
            mongo_db_name: "searchgate".to_string(),
        }
    }
}

pub fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_opt(key).unwrap_or_else(|| default.to_string())
}

fn get_millis_or_default(key: &str, default: u64) -> Result<Duration> {
    match get_env_opt(key) {
        Some(raw) => parse_millis(&raw).with_context(|| format!("Invalid value for {key}")),
        None => Ok(Duration::from_millis(default)),
    }
}

fn parse_millis(raw: &str) -> Result<Duration> {
    let millis: u64 = raw.parse().context("expected a whole number of milliseconds")?;
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://idp.local/"), "http://idp.local");
        assert_eq!(trim_base_url(" http://idp.local// "), "http://idp.local");
        assert_eq!(trim_base_url("http://manager:5000"), "http://manager:5000");
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("250").unwrap(), Duration::from_millis(250));
        assert!(parse_millis("five").is_err());
        assert!(parse_millis("-1").is_err());
    }

    #[test]
    fn test_identity_requires_both_settings() {
        let mut config = Config::default();
        assert_eq!(config.identity(), Err("IDENTITY_URL and IDENTITY_KEY"));

        config.identity_url = Some("http://idp".to_string());
        assert_eq!(config.identity(), Err("IDENTITY_KEY"));

        config.identity_key = Some("key".to_string());
        assert_eq!(config.identity(), Ok(("http://idp", "key")));

        config.identity_url = None;
        assert_eq!(config.identity(), Err("IDENTITY_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.manager_url, DEFAULT_MANAGER_URL);
        assert_eq!(config.manager_timeout, Duration::from_secs(5));
        assert!(config.mongo_uri.is_none());
    }
}
