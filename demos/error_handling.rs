//! Example demonstrating how failures are classified.
//!
//! Uses the same environment variables as `basic_call`.
//!
//! Run with: `cargo run --example error_handling`

use registerblast::{Client, Error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("registerblast=info")
        .init();

    let url = std::env::var("REGISTERBLAST_URL")?;
    let api_key = std::env::var("REGISTERBLAST_API_KEY")?;

    println!("=== Example 1: Rejected Login ===");
    let client = Client::builder()
        .base_url(&url)?
        .api_key(&api_key)
        .credentials("nobody", "wrong-password")
        .build()?;

    match client.login().await {
        Ok(()) => println!("Unexpected success"),
        Err(Error::Authentication(reason)) => println!("Authentication error: {}", reason),
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Local Validation ===");
    // Caught before any request is sent.
    let body = serde_json::json!({
        "startDate": "2021-02-24T05:00:00.000",
        "endDate": "2021-02-25T04:59:59.000Z",
        "examGroups": [],
        "duration": 60
    });
    match client.get_availability(&body).await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Validation { field, message }) => {
            println!("Validation error on {}: {}", field, message);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Provider Refusals ===");
    let client = Client::builder()
        .base_url(&url)?
        .api_key(&api_key)
        .credentials(
            std::env::var("REGISTERBLAST_USERNAME")?,
            std::env::var("REGISTERBLAST_PASSWORD")?,
        )
        .build()?;

    match client.cancel_appointment("no-such-campus", "0").await {
        Ok(outcome) => println!("Cancelled: {:?}", outcome.data),
        Err(Error::Business { payload }) => println!("Provider refused: {}", payload),
        Err(Error::HttpError {
            status,
            raw_response,
            payload,
            ..
        }) => {
            println!("HTTP Error!");
            println!("  Status: {}", status);
            println!("  Raw response: {}", raw_response);
            println!("  Parsed payload: {:?}", payload);
        }
        Err(e) if e.is_transport() => println!("Transport failure: {}", e),
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 4: Network Errors ===");
    let bad_client = Client::builder()
        .base_url("https://this-domain-does-not-exist-12345.com")?
        .api_key(&api_key)
        .token("unused")
        .build()?;

    match bad_client.get_campus_details("moorhead").await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Network(e)) => {
            println!("Network Error!");
            println!("  Error: {}", e);
            println!("  Is connect error: {}", e.is_connect());
        }
        Err(e) => println!("Other error: {}", e),
    }

    Ok(())
}
