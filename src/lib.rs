//! # CPBM Rust SDK
//!
//! Rust client for the CloudPortal Business Manager billing API.
//!
//! CPBM authenticates requests with a per-request HMAC-SHA1 signature over
//! the query parameters rather than bearer tokens. This crate implements the
//! signing scheme and a small async client on top of it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cpbm::{Client, ClientConfig, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_config(
//!         Credentials::new("my-api-key", "my-secret-key"),
//!         ClientConfig {
//!             endpoint: Some("https://billing.example.com/portal/api".to_string()),
//!             ..Default::default()
//!         },
//!     );
//!
//!     // List accounts
//!     let accounts = client.get("/accounts", &[]).await?;
//!     println!("{accounts:#}");
//!
//!     // Create an account (payload implies POST)
//!     let created = client
//!         .request(
//!             "/accounts",
//!             &[],
//!             Some(&serde_json::json!({"name": "ACME Corp"})),
//!             None,
//!         )
//!         .await?;
//!     println!("{created:#}");
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration files
//!
//! Configuration can be assembled from a JSON file plus explicit overrides,
//! with overrides winning:
//!
//! ```rust,no_run
//! use cpbm::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let overrides = Config {
//!     endpoint: Some("https://staging.example.com/portal/api".to_string()),
//!     ..Default::default()
//! };
//! let client = Config::from_file("cpbm.json")?
//!     .merged_with(overrides)
//!     .into_client()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, CpbmError>`:
//!
//! ```rust,no_run
//! use cpbm::{Client, Credentials, CpbmError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new(Credentials::new("key", "secret"));
//!
//!     match client.get("/accounts", &[]).await {
//!         Ok(accounts) => println!("{accounts}"),
//!         Err(CpbmError::Api { status, body }) => println!("server said {status}: {body}"),
//!         Err(CpbmError::Transport(e)) => println!("network failure: {e}"),
//!         Err(e) => println!("error: {e}"),
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod log;
pub mod sign;

// Re-export main types at the crate root
pub use client::{Client, ClientConfig, Credentials};
pub use config::Config;
pub use error::{CpbmError, Result};
pub use log::{LogEntry, RequestLog};
pub use sign::{sign, sign_at, SignedQuery};
