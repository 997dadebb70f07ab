use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::model::{ApiAccess, SpeakPolicy};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UpstreamCfg {
    /// URL the chat turn is POSTed to.
    pub endpoint: String,
    /// Optional upstream host forwarded inside the request payload.
    #[serde(default)]
    pub api_host: Option<String>,
    /// Name of the environment variable that contains the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Name of the environment variable that contains the routing key.
    #[serde(default)]
    pub routing_key_env: Option<String>,
}

impl UpstreamCfg {
    /// Resolve the credentials this config points at. Unset or missing
    /// environment variables simply leave the field absent.
    pub fn access(&self) -> ApiAccess {
        let env_secret = |name: &Option<String>| {
            name.as_deref()
                .and_then(|n| std::env::var(n).ok())
                .map(|v| SecretString::new(v.into()))
        };
        ApiAccess {
            host: self.api_host.clone(),
            key: env_secret(&self.api_key_env),
            org_id: self.organization_id.clone(),
            routing_key: env_secret(&self.routing_key_env),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpCfg {
    /// TCP connect timeout in milliseconds (default 5000ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Optional total request timeout in milliseconds. Reply streams are
    /// long-lived, so there is no cap unless one is configured.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Per-host idle connection pool cap (default 8)
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: None,
            pool_max_idle_per_host: default_pool_max_idle(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_pool_max_idle() -> usize {
    8
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SpeechCfg {
    #[serde(default)]
    pub auto_speak: SpeakPolicy,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub upstream: UpstreamCfg,
    /// HTTP client configuration (timeouts, pooling). Missing in older configs → defaults.
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub speech: SpeechCfg,
}

impl Config {
    /// Load a Config from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::error::CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(crate::error::TurnStreamError::from)?;
        let s = std::str::from_utf8(&bytes)
            .map_err(|e| crate::error::TurnStreamError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::TurnStreamError::Other(e.into()))?,
            Some("toml") => toml::from_str::<Self>(s)
                .map_err(|e| crate::error::TurnStreamError::Other(e.into()))?,
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::TurnStreamError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s)
                        .map_err(|e| crate::error::TurnStreamError::Other(e.into()))
                })?,
        };
        Ok(cfg)
    }
}
