use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lemma_codec::CodecConfig;
use lemma_gate::GateConfig;

use crate::error::{ServerError, ServerResult};

/// Effective server configuration.
///
/// Built from [`Default`], then an optional TOML file, then the environment
/// (see [`ServerConfig::apply_env`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Public base URL of this server, used in activation links.
    pub server_url: String,
    /// Front-end URL that `/verify` redirects to.
    pub website: String,
    /// Bound on chain and search reads, in milliseconds. Zero disables it.
    pub query_timeout_ms: u64,
    /// Response cache lifetime, in minutes. Zero disables caching.
    pub cache_duration_mins: u64,
    /// reCAPTCHA secret. Empty disables the bot check.
    pub recaptcha_secret: String,
    pub codec: CodecConfig,
    pub gate: GateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 1323)),
            server_url: "http://localhost:1323".into(),
            website: "http://localhost:3000".into(),
            query_timeout_ms: 300,
            cache_duration_mins: 15,
            recaptcha_secret: String::new(),
            codec: CodecConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> ServerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::Config(format!("{key} is malformed: {value:?}")))
}

impl ServerConfig {
    /// Read `path` if given, then apply the process environment.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Override fields from environment variables looked up through `var`:
    /// `BIND_ADDR`, `LISTEN_PORT`, `HASHID_SALT`, `MAX_PAYLOAD_KB`,
    /// `QUERY_TIMEOUT`, `CACHE_DURATION`, `RECAPTCHA_SECRET`,
    /// `SERVER_HOST_URL` and `WEBSITE`.
    pub fn apply_env<F>(mut self, var: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("BIND_ADDR") {
            self.bind_addr = parse_env("BIND_ADDR", &addr)?;
        }
        if let Some(port) = var("LISTEN_PORT") {
            self.bind_addr.set_port(parse_env("LISTEN_PORT", &port)?);
        }
        if let Some(salt) = var("HASHID_SALT") {
            self.codec.salt = salt;
        }
        if let Some(kb) = var("MAX_PAYLOAD_KB") {
            self.gate.max_payload_kb = parse_env("MAX_PAYLOAD_KB", &kb)?;
        }
        if let Some(ms) = var("QUERY_TIMEOUT") {
            self.query_timeout_ms = parse_env("QUERY_TIMEOUT", &ms)?;
        }
        if let Some(mins) = var("CACHE_DURATION") {
            self.cache_duration_mins = parse_env("CACHE_DURATION", &mins)?;
            self.cache_ttl()?;
        }
        if let Some(secret) = var("RECAPTCHA_SECRET") {
            self.recaptcha_secret = secret;
        }
        if let Some(url) = var("SERVER_HOST_URL") {
            self.server_url = url;
        }
        if let Some(url) = var("WEBSITE") {
            self.website = url;
        }
        Ok(self)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    pub fn cache_ttl(&self) -> ServerResult<Duration> {
        self.cache_duration_mins
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "CACHE_DURATION is malformed: {} minutes overflows",
                    self.cache_duration_mins
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr.port(), 1323);
        assert_eq!(c.query_timeout(), Some(Duration::from_millis(300)));
        assert_eq!(c.cache_ttl().unwrap(), Duration::from_secs(15 * 60));
        assert_eq!(c.gate.max_payload_kb, 12);
        assert!(c.recaptcha_secret.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml(
            r#"
            website = "https://lemma.test"

            [gate]
            max_parents = 10
            "#,
        )
        .unwrap();
        assert_eq!(c.website, "https://lemma.test");
        assert_eq!(c.gate.max_parents, 10);
        assert_eq!(c.gate.max_payload_kb, 12);
        assert_eq!(c.codec, CodecConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let c = ServerConfig::default();
        assert_eq!(ServerConfig::from_toml(&c.to_toml().unwrap()).unwrap(), c);
    }

    #[test]
    fn env_overrides() {
        let c = ServerConfig::default()
            .apply_env(env(&[
                ("LISTEN_PORT", "8080"),
                ("HASHID_SALT", "pepper"),
                ("MAX_PAYLOAD_KB", "4"),
                ("QUERY_TIMEOUT", "0"),
                ("CACHE_DURATION", "0"),
                ("SERVER_HOST_URL", "https://api.lemma.test"),
            ]))
            .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.codec.salt, "pepper");
        assert_eq!(c.gate.max_payload_kb, 4);
        assert_eq!(c.query_timeout(), None);
        assert!(c.cache_ttl().unwrap().is_zero());
        assert_eq!(c.server_url, "https://api.lemma.test");
    }

    #[test]
    fn malformed_env_is_an_error() {
        let err = ServerConfig::default()
            .apply_env(env(&[("QUERY_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(msg) if msg.contains("QUERY_TIMEOUT")));
    }

    #[test]
    fn overflowing_cache_duration_is_an_error() {
        let huge = u64::MAX.to_string();
        let err = ServerConfig::default()
            .apply_env(env(&[("CACHE_DURATION", huge.as_str())]))
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(msg) if msg.contains("CACHE_DURATION")));

        let from_file = ServerConfig {
            cache_duration_mins: u64::MAX,
            ..ServerConfig::default()
        };
        assert!(from_file.cache_ttl().is_err());
    }
}
