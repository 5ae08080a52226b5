//! Command-line interface for the CPBM SDK.
//!
//! Makes a single signed API call and prints the decoded JSON result:
//!
//! ```bash
//! cpbm --api-key KEY --secret-key SECRET /accounts
//! cpbm --json cpbm.json /accounts --param "page=1"
//! cpbm --json cpbm.json /accounts --payload '{"name":"ACME"}'
//! ```
//!
//! Configuration precedence: defaults < `--json` config file < explicit
//! flags.

use anyhow::{bail, Context, Result};
use clap::Parser;
use cpbm::Config;
use reqwest::Method;
use tracing::Level;

/// Make signed calls to a CloudPortal Business Manager API.
#[derive(Parser)]
#[command(name = "cpbm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API path to request, e.g. /accounts
    path: String,

    /// Query parameter as key=value (repeatable, transmitted in order)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// JSON payload; implies POST unless --method is given
    #[arg(long, value_name = "JSON")]
    payload: Option<String>,

    /// HTTP method (GET | POST | PUT | DELETE)
    #[arg(short, long)]
    method: Option<String>,

    /// Path to a JSON config file (same keys as the flags, without the --)
    #[arg(long, value_name = "FILE")]
    json: Option<String>,

    /// CPBM API key
    #[arg(long)]
    api_key: Option<String>,

    /// CPBM secret key
    #[arg(long)]
    secret_key: Option<String>,

    /// Pre-joined endpoint URL, e.g. http://127.0.0.1:8080/portal/api
    #[arg(long)]
    endpoint: Option<String>,

    /// CPBM host (including port); alias for --endpoint together with
    /// --protocol and --base-path
    #[arg(long, conflicts_with = "endpoint")]
    host: Option<String>,

    /// Protocol used to connect (http | https)
    #[arg(long, conflicts_with = "endpoint")]
    protocol: Option<String>,

    /// Base API path, e.g. /portal/api
    #[arg(long, conflicts_with = "endpoint")]
    base_path: Option<String>,

    /// Turn the request log on or off
    #[arg(long)]
    logging: Option<bool>,

    /// Request log file path
    #[arg(long)]
    log: Option<String>,

    /// Truncate the request log at startup
    #[arg(long)]
    clear_log: Option<bool>,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            api_key: self.api_key.clone(),
            secret_key: self.secret_key.clone(),
            endpoint: self.endpoint.clone(),
            host: self.host.clone(),
            protocol: self.protocol.clone(),
            base_path: self.base_path.clone(),
            logging: self.logging,
            log: self.log.clone(),
            clear_log: self.clear_log,
            timeout_secs: None,
        }
    }
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
            _ => bail!("invalid --param {entry:?}, expected KEY=VALUE"),
        })
        .collect()
}

fn parse_method(raw: &str) -> Result<Method> {
    match raw.to_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        other => bail!("unsupported method {other:?}, expected GET | POST | PUT | DELETE"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let base = match &cli.json {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = base.merged_with(cli.overrides());

    let payload = cli
        .payload
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--payload is not valid JSON")?;
    let method = cli.method.as_deref().map(parse_method).transpose()?;
    let params = parse_params(&cli.params)?;
    let param_refs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let client = config.into_client()?;
    let result = client
        .request(&cli.path, &param_refs, payload.as_ref(), method)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
