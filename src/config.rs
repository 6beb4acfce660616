//! Environment configuration. A `.env` file in the working directory is read first.

use crate::polling::{BackoffPolicy, PollConfig};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid {var} value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Address the HTTP server binds.
    pub http_addr: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log: String,
    pub order_poll: Duration,
    pub location_poll: Duration,
    pub backoff_step: Duration,
    pub backoff_cap: Duration,
    pub status_cooldown: Duration,
    pub actor_buffer: usize,
    /// Create a demo order and assignment on startup.
    pub seed_demo: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:8080".to_string(),
            log: "info".to_string(),
            order_poll: Duration::from_secs(10),
            location_poll: Duration::from_secs(5),
            backoff_step: Duration::from_secs(5),
            backoff_cap: Duration::from_secs(60),
            status_cooldown: Duration::from_millis(2000),
            actor_buffer: 32,
            seed_demo: false,
        }
    }
}

fn parse<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

fn positive<T: PartialEq + Default + ToString>(var: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

impl CoordinatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Builds the config from any variable lookup. Unset variables take their default.
    ///
    /// Poll periods, backoff step and actor buffer must be non-zero, and the backoff cap
    /// must not be below the step. A zero cooldown disables it.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();
        let secs = |var: &'static str, default: Duration| {
            parse(var, get(var), default.as_secs())
                .and_then(|n| positive(var, n))
                .map(Duration::from_secs)
        };

        let config = Self {
            http_addr: get("SUPERNOVA_HTTP_ADDR").unwrap_or(d.http_addr),
            log: get("SUPERNOVA_LOG").unwrap_or(d.log),
            order_poll: secs("SUPERNOVA_ORDER_POLL_SECS", d.order_poll)?,
            location_poll: secs("SUPERNOVA_LOCATION_POLL_SECS", d.location_poll)?,
            backoff_step: secs("SUPERNOVA_BACKOFF_STEP_SECS", d.backoff_step)?,
            backoff_cap: secs("SUPERNOVA_BACKOFF_CAP_SECS", d.backoff_cap)?,
            status_cooldown: parse(
                "SUPERNOVA_STATUS_COOLDOWN_MS",
                get("SUPERNOVA_STATUS_COOLDOWN_MS"),
                d.status_cooldown.as_millis() as u64,
            )
            .map(Duration::from_millis)?,
            actor_buffer: parse("SUPERNOVA_ACTOR_BUFFER", get("SUPERNOVA_ACTOR_BUFFER"), d.actor_buffer)
                .and_then(|n| positive("SUPERNOVA_ACTOR_BUFFER", n))?,
            seed_demo: parse("SUPERNOVA_SEED_DEMO", get("SUPERNOVA_SEED_DEMO"), d.seed_demo)?,
        };

        if config.backoff_cap < config.backoff_step {
            return Err(ConfigError::Invalid {
                var: "SUPERNOVA_BACKOFF_CAP_SECS",
                value: config.backoff_cap.as_secs().to_string(),
                reason: format!(
                    "must be at least the backoff step ({}s)",
                    config.backoff_step.as_secs()
                ),
            });
        }
        Ok(config)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            order_every: self.order_poll,
            location_every: self.location_poll,
            backoff: BackoffPolicy {
                step: self.backoff_step,
                cap: self.backoff_cap,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CoordinatorConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoordinatorConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_match_poll_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, CoordinatorConfig::default());
        assert_eq!(config.poll_config(), PollConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SUPERNOVA_HTTP_ADDR", "0.0.0.0:9000"),
            ("SUPERNOVA_ORDER_POLL_SECS", "3"),
            ("SUPERNOVA_STATUS_COOLDOWN_MS", "500"),
            ("SUPERNOVA_SEED_DEMO", "true"),
        ])
        .unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:9000");
        assert_eq!(config.poll_config().order_every, Duration::from_secs(3));
        assert_eq!(config.status_cooldown, Duration::from_millis(500));
        assert!(config.seed_demo);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let err = load(&[("SUPERNOVA_ACTOR_BUFFER", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "SUPERNOVA_ACTOR_BUFFER", .. }
        ));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        for var in [
            "SUPERNOVA_ACTOR_BUFFER",
            "SUPERNOVA_ORDER_POLL_SECS",
            "SUPERNOVA_LOCATION_POLL_SECS",
            "SUPERNOVA_BACKOFF_STEP_SECS",
            "SUPERNOVA_BACKOFF_CAP_SECS",
        ] {
            let err = load(&[(var, "0")]).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    var,
                    value: "0".to_string(),
                    reason: "must be greater than zero".to_string(),
                },
            );
        }

        let config = load(&[("SUPERNOVA_STATUS_COOLDOWN_MS", "0")]).unwrap();
        assert!(config.status_cooldown.is_zero());
    }

    #[test]
    fn test_backoff_cap_below_step_is_rejected() {
        let err = load(&[
            ("SUPERNOVA_BACKOFF_STEP_SECS", "10"),
            ("SUPERNOVA_BACKOFF_CAP_SECS", "5"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "SUPERNOVA_BACKOFF_CAP_SECS", .. }
        ));
        assert!(load(&[("SUPERNOVA_BACKOFF_CAP_SECS", "5")]).is_ok());
    }
}
