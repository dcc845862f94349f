use anyhow::{bail, Context};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::game::constants::TICK_MS;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tick_interval: Duration,
    pub requeue_after_game: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tick_interval: Duration::from_millis(TICK_MS),
            requeue_after_game: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let host = lookup("HOST")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let tick_ms = parse_var::<u64>(&lookup, "TICK_MS")?.unwrap_or(TICK_MS);
        if tick_ms == 0 {
            bail!("TICK_MS must be greater than zero");
        }
        let requeue_after_game = match lookup("REQUEUE_AFTER_GAME") {
            Some(value) => parse_flag("REQUEUE_AFTER_GAME", &value)?,
            None => defaults.requeue_after_game,
        };

        Ok(Self {
            host,
            port,
            tick_interval: Duration::from_millis(tick_ms),
            requeue_after_game,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(name) else { return Ok(None) };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .with_context(|| format!("{name} has invalid value '{trimmed}'"))
}

fn parse_flag(name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" => Ok(true),
        "" | "0" | "false" | "FALSE" | "no" => Ok(false),
        other => bail!("{name} must be a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.tick_interval, Duration::from_millis(333));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("TICK_MS", "50"),
            ("REQUEUE_AFTER_GAME", "true"),
        ])
        .unwrap();
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert!(config.requeue_after_game);
    }

    #[test]
    fn rejects_invalid_values() {
        let error = config_from(&[("PORT", "eighty")]).expect_err("bad port");
        assert!(error.to_string().contains("PORT has invalid value"));
        assert!(config_from(&[("PORT", "70000")]).is_err());
        assert!(config_from(&[("TICK_MS", "0")]).is_err());
        assert!(config_from(&[("REQUEUE_AFTER_GAME", "maybe")]).is_err());
    }
}
