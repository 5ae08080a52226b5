//! Client configuration.
//!
//! A [`Config`] is a plain value assembled from defaults, an optional JSON
//! config file, and explicit overrides (CLI flags or code). Precedence is
//! defaults < file < explicit overrides, matching the historical CLI
//! behavior. Once assembled, [`Config::into_client`] validates it and builds
//! a [`Client`]; the signing/request machinery never touches configuration
//! sources directly.
//!
//! The canonical endpoint style is a single pre-joined URL, e.g.
//! `http://127.0.0.1:8080/portal/api`. The legacy `host`/`protocol`/
//! `base_path` trio is accepted as an alias and composed into an endpoint
//! only when `endpoint` itself is absent.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::{Client, ClientConfig, Credentials};
use crate::error::{CpbmError, Result};
use crate::log::RequestLog;

const DEFAULT_LOG_PATH: &str = "logs/cpbm.log";

/// Assembled client configuration.
///
/// `Option` fields distinguish "not set" from "set to a value" so that
/// layered merging keeps the right precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// API key (required to make calls).
    pub api_key: Option<String>,
    /// Secret key (required to make calls, sensitive).
    pub secret_key: Option<String>,
    /// Pre-joined endpoint URL (canonical style).
    pub endpoint: Option<String>,
    /// Legacy alias: host (including port), composed with `protocol` and
    /// `base_path` when `endpoint` is not set.
    pub host: Option<String>,
    /// Legacy alias: `http` or `https`.
    pub protocol: Option<String>,
    /// Legacy alias: base API path, e.g. `/portal/api`.
    pub base_path: Option<String>,
    /// Whether to write a request log (default: true).
    pub logging: Option<bool>,
    /// Request log file path (default: `logs/cpbm.log`).
    pub log: Option<String>,
    /// Truncate the log file when the client is created (default: true).
    pub clear_log: Option<bool>,
    /// Per-call timeout in seconds (default: 30).
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            CpbmError::Configuration(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            CpbmError::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Layer `overrides` on top of `self`: any field set in `overrides` wins.
    pub fn merged_with(self, overrides: Config) -> Config {
        Config {
            api_key: overrides.api_key.or(self.api_key),
            secret_key: overrides.secret_key.or(self.secret_key),
            endpoint: overrides.endpoint.or(self.endpoint),
            host: overrides.host.or(self.host),
            protocol: overrides.protocol.or(self.protocol),
            base_path: overrides.base_path.or(self.base_path),
            logging: overrides.logging.or(self.logging),
            log: overrides.log.or(self.log),
            clear_log: overrides.clear_log.or(self.clear_log),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// The effective endpoint, composing the legacy trio when no pre-joined
    /// endpoint is set. `None` means "use the client default".
    pub fn effective_endpoint(&self) -> Option<String> {
        if self.endpoint.is_some() {
            return self.endpoint.clone();
        }
        self.host.as_ref().map(|host| {
            let protocol = self.protocol.as_deref().unwrap_or("http");
            let base_path = self.base_path.as_deref().unwrap_or("/portal/api");
            format!("{}://{}{}", protocol, host, base_path)
        })
    }

    /// Validate and build a [`Client`].
    pub fn into_client(self) -> Result<Client> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CpbmError::Configuration("api_key is required".to_string()))?
            .to_string();
        let secret_key = self
            .secret_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CpbmError::Configuration("secret_key is required".to_string()))?
            .to_string();

        let log = if self.logging.unwrap_or(true) {
            let path = self.log.as_deref().unwrap_or(DEFAULT_LOG_PATH);
            let clear = self.clear_log.unwrap_or(true);
            Some(RequestLog::open(path, clear)?)
        } else {
            None
        };

        let endpoint = self.effective_endpoint();
        Ok(Client::with_config(
            Credentials::new(api_key, secret_key),
            ClientConfig {
                endpoint,
                timeout: self.timeout_secs.map(Duration::from_secs),
                user_agent: None,
                log,
            },
        ))
    }
}
