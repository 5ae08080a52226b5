//! Basic usage example for the CPBM SDK.
//!
//! This example demonstrates:
//! - Building a client from environment credentials
//! - Listing accounts (GET)
//! - Creating an account (POST with a JSON payload)
//!
//! Run with:
//! ```bash
//! CPBM_API_KEY=... CPBM_SECRET_KEY=... CPBM_ENDPOINT=http://127.0.0.1:8080/portal/api \
//!     cargo run --example basic
//! ```

use cpbm::{Client, ClientConfig, Credentials};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key =
        std::env::var("CPBM_API_KEY").expect("CPBM_API_KEY environment variable required");
    let secret_key =
        std::env::var("CPBM_SECRET_KEY").expect("CPBM_SECRET_KEY environment variable required");
    let endpoint = std::env::var("CPBM_ENDPOINT").ok();

    println!("Creating CPBM client...");
    let client = Client::with_config(
        Credentials::new(api_key, secret_key),
        ClientConfig {
            endpoint,
            ..Default::default()
        },
    );

    println!("\nListing accounts...");
    let accounts = client.get("/accounts", &[]).await?;
    println!("{}", serde_json::to_string_pretty(&accounts)?);

    println!("\nCreating an account...");
    let created = client
        .post(
            "/accounts",
            &[],
            &serde_json::json!({
                "name": "ACME Corp",
                "currency": "USD"
            }),
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&created)?);

    Ok(())
}
