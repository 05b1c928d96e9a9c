//! Configuration management

use anyhow::{self, Context, Result};

use crate::defaults::{DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_HTTP_BIND_ADDR};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on
    pub http_bind_addr: String,

    /// NATS server URL (optional, NATS handlers are skipped when unset)
    pub nats_url: Option<String>,

    /// NATS user/password, used only when both are set
    pub nats_user: Option<String>,
    pub nats_password: Option<String>,

    /// Average travel speed used for travel-time estimates
    pub average_speed_kmh: f64,

    /// Directory for rotating log files
    pub logs_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let http_bind_addr = var("HTTP_BIND_ADDR").unwrap_or_else(|| DEFAULT_HTTP_BIND_ADDR.to_string());

        let average_speed_kmh = match var("AVERAGE_SPEED_KMH") {
            Some(raw) => parse_speed(&raw)?,
            None => DEFAULT_AVERAGE_SPEED_KMH,
        };

        let logs_dir = var("LOGS_DIR").unwrap_or_else(|| "../logs".to_string());

        Ok(Self {
            http_bind_addr,
            nats_url: var("NATS_URL"),
            nats_user: var("NATS_USER"),
            nats_password: var("NATS_PASSWORD"),
            average_speed_kmh,
            logs_dir,
        })
    }
}

fn parse_speed(raw: &str) -> Result<f64> {
    let speed: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("AVERAGE_SPEED_KMH must be a number (got {:?})", raw))?;

    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("AVERAGE_SPEED_KMH must be a positive number (got {})", speed);
    }

    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_parse_speed_accepts_positive_numbers() {
        assert_eq!(parse_speed("35").unwrap(), 35.0);
        assert_eq!(parse_speed(" 42.5 ").unwrap(), 42.5);
    }

    #[test]
    fn test_parse_speed_rejects_invalid_values() {
        assert!(parse_speed("fast").is_err());
        assert!(parse_speed("0").is_err());
        assert!(parse_speed("-10").is_err());
        assert!(parse_speed("inf").is_err());
    }

    #[test]
    fn test_config_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.http_bind_addr, DEFAULT_HTTP_BIND_ADDR);
        assert!(config.nats_url.is_none());
        assert!(config.nats_user.is_none());
        assert_eq!(config.average_speed_kmh, DEFAULT_AVERAGE_SPEED_KMH);
        assert_eq!(config.logs_dir, "../logs");
    }

    #[test]
    fn test_config_reads_overrides() {
        let config = config_from(&[
            ("HTTP_BIND_ADDR", "127.0.0.1:9000"),
            ("NATS_URL", "nats://localhost:4222"),
            ("NATS_USER", "agenda"),
            ("NATS_PASSWORD", "secret"),
            ("AVERAGE_SPEED_KMH", "50"),
            ("LOGS_DIR", "/var/log/agenda"),
        ])
        .unwrap();

        assert_eq!(config.http_bind_addr, "127.0.0.1:9000");
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
        assert_eq!(config.nats_user.as_deref(), Some("agenda"));
        assert_eq!(config.nats_password.as_deref(), Some("secret"));
        assert_eq!(config.average_speed_kmh, 50.0);
        assert_eq!(config.logs_dir, "/var/log/agenda");
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = config_from(&[("NATS_URL", ""), ("AVERAGE_SPEED_KMH", "")]).unwrap();
        assert!(config.nats_url.is_none());
        assert_eq!(config.average_speed_kmh, DEFAULT_AVERAGE_SPEED_KMH);
    }

    #[test]
    fn test_invalid_speed_fails_config() {
        let err = config_from(&[("AVERAGE_SPEED_KMH", "fast")]).unwrap_err();
        assert!(err.to_string().contains("AVERAGE_SPEED_KMH"));
    }
}
