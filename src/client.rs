//! CPBM API client.
//!
//! The main entry point for talking to a CloudPortal Business Manager
//! endpoint. The client owns the credentials and endpoint, signs every
//! outgoing request via [`crate::sign`], and turns HTTP responses into
//! decoded JSON values or typed errors.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::{CpbmError, Result};
use crate::log::{now_rfc3339, redact_signature, LogEntry, RequestLog};
use crate::sign;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/portal/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API credentials.
///
/// Immutable once the client is constructed. The secret key is never
/// logged; `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    /// API key, transmitted as the `apiKey` query parameter.
    pub api_key: String,
    /// Secret key used for HMAC signing. Never transmitted.
    pub secret_key: String,
}

impl Credentials {
    /// Create credentials from key material.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Configuration options for the client.
#[derive(Debug)]
pub struct ClientConfig {
    /// Base endpoint the request path is appended to
    /// (default: `http://127.0.0.1:8080/portal/api`).
    pub endpoint: Option<String>,
    /// Per-call timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Request log sink; `None` disables logging.
    pub log: Option<RequestLog>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: None,
            user_agent: None,
            log: None,
        }
    }
}

/// CPBM API client.
///
/// # Example
///
/// ```rust,no_run
/// use cpbm::{Client, Credentials};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new(Credentials::new("my-api-key", "my-secret-key"));
///     let accounts = client.get("/accounts", &[]).await?;
///     println!("{accounts:#}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    endpoint: String,
    credentials: Credentials,
    log: Option<Arc<RequestLog>>,
}

impl Client {
    /// Create a client with default configuration.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cpbm::{Client, ClientConfig, Credentials};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config(
    ///     Credentials::new("key", "secret"),
    ///     ClientConfig {
    ///         endpoint: Some("https://billing.example.com/portal/api".to_string()),
    ///         timeout: Some(Duration::from_secs(60)),
    ///         ..Default::default()
    ///     },
    /// );
    /// ```
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        let timeout = config
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| format!("cpbm-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            endpoint: config
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            credentials,
            log: config.log.map(Arc::new),
        }
    }

    /// The base endpoint requests are issued against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Make a signed API call.
    ///
    /// `path` is appended to the endpoint (include the leading `/`, e.g.
    /// `/accounts`). `params` are transmitted in the given order; the signing
    /// timestamp and the API key are appended automatically. When `method` is
    /// `None` the verb is inferred: POST if a payload is present, GET
    /// otherwise. POST and PUT carry `payload` as a JSON body; GET and DELETE
    /// send no body.
    pub async fn request(
        &self,
        path: &str,
        params: &[(&str, &str)],
        payload: Option<&Value>,
        method: Option<Method>,
    ) -> Result<Value> {
        if self.credentials.api_key.is_empty() || self.credentials.secret_key.is_empty() {
            return Err(CpbmError::Configuration(
                "api_key and secret_key are required".to_string(),
            ));
        }

        let method = method.unwrap_or(if payload.is_some() {
            Method::POST
        } else {
            Method::GET
        });

        let signed = sign::sign(
            path,
            params,
            &self.credentials.api_key,
            &self.credentials.secret_key,
        );
        let url = format!("{}{}?{}", self.endpoint, path, signed.to_query_suffix());

        debug!(method = %method, url = %redact_signature(&url), "dispatching request");

        let mut builder = self.http.request(method.clone(), &url);
        if matches!(method, Method::POST | Method::PUT) {
            if let Some(body) = payload {
                builder = builder.json(body);
            }
        }

        let outcome = self.execute(builder).await;
        self.log_call(&method, &url, payload, &outcome);
        outcome
    }

    /// Signed GET request.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.request(path, params, None, Some(Method::GET)).await
    }

    /// Signed POST request with a JSON body.
    pub async fn post(&self, path: &str, params: &[(&str, &str)], payload: &Value) -> Result<Value> {
        self.request(path, params, Some(payload), Some(Method::POST))
            .await
    }

    /// Signed PUT request with a JSON body.
    pub async fn put(&self, path: &str, params: &[(&str, &str)], payload: &Value) -> Result<Value> {
        self.request(path, params, Some(payload), Some(Method::PUT))
            .await
    }

    /// Signed DELETE request.
    pub async fn delete(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.request(path, params, None, Some(Method::DELETE)).await
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CpbmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| CpbmError::Decode {
            message: e.to_string(),
            body,
        })
    }

    fn log_call(&self, method: &Method, url: &str, payload: Option<&Value>, outcome: &Result<Value>) {
        let Some(log) = &self.log else { return };

        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e.to_string())),
        };
        log.record(&LogEntry {
            timestamp: now_rfc3339(),
            method: method.as_str(),
            url: redact_signature(url),
            payload,
            result,
            error,
        });
    }
}
