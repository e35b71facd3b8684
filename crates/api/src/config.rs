//! Application configuration loaded from environment variables.

use std::time::Duration;

use services::{RetryPolicy, StockPolicy};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: PostgreSQL URL; unset keeps events in memory
/// - `STOCK_POLICY`: `reserve_at_checkout` or `decrement_on_accept`
/// - `RETRY_MAX_ATTEMPTS`, `RETRY_INITIAL_BACKOFF_MS`, `RETRY_MAX_BACKOFF_MS`
/// - `ADMIN_TOKEN`: bearer token registered for an administrator
///
/// Unparseable values fall back to the default and are reported by
/// [`Config::report_fallbacks`].
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub stock_policy: StockPolicy,
    pub retry: RetryPolicy,
    pub admin_token: Option<String>,
    fallbacks: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }
        config.database_url = lookup("DATABASE_URL");
        config.admin_token = lookup("ADMIN_TOKEN");

        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => config.fallback("PORT", &raw),
            }
        }
        if let Some(raw) = lookup("LOG_FORMAT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "text" => config.log_format = LogFormat::Text,
                "json" => config.log_format = LogFormat::Json,
                _ => config.fallback("LOG_FORMAT", &raw),
            }
        }
        if let Some(raw) = lookup("STOCK_POLICY") {
            match StockPolicy::parse(&raw) {
                Some(policy) => config.stock_policy = policy,
                None => config.fallback("STOCK_POLICY", &raw),
            }
        }

        let defaults = RetryPolicy::default();
        let max_attempts = config.number("RETRY_MAX_ATTEMPTS", &lookup, defaults.max_attempts.into());
        let initial = config.number(
            "RETRY_INITIAL_BACKOFF_MS",
            &lookup,
            defaults.initial_backoff.as_millis() as u64,
        );
        let max = config.number(
            "RETRY_MAX_BACKOFF_MS",
            &lookup,
            defaults.max_backoff.as_millis() as u64,
        );
        config.retry = RetryPolicy::new(
            u32::try_from(max_attempts).unwrap_or(defaults.max_attempts),
            Duration::from_millis(initial),
            Duration::from_millis(max),
        );

        config
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Variables whose values were ignored, as `NAME=value`.
    pub fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }

    /// Logs every ignored variable. Call once tracing is up.
    pub fn report_fallbacks(&self) {
        for entry in &self.fallbacks {
            tracing::warn!(variable = %entry, "invalid configuration value, using default");
        }
    }

    fn number(&mut self, key: &str, lookup: &impl Fn(&str) -> Option<String>, default: u64) -> u64 {
        match lookup(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                self.fallback(key, &raw);
                default
            }),
            None => default,
        }
    }

    fn fallback(&mut self, key: &str, raw: &str) {
        self.fallbacks.push(format!("{key}={raw}"));
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            stock_policy: StockPolicy::default(),
            retry: RetryPolicy::default(),
            admin_token: None,
            fallbacks: Vec::new(),
        }
    }
}
