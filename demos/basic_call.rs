//! Basic example: log in, look up a campus and search availability.
//!
//! Reads connection details from the environment:
//! `REGISTERBLAST_URL`, `REGISTERBLAST_API_KEY`, `REGISTERBLAST_USERNAME`,
//! `REGISTERBLAST_PASSWORD` and `REGISTERBLAST_CAMPUS`.
//!
//! Run with: `cargo run --example basic_call`

use registerblast::{AvailabilityQuery, Client, Error};

fn env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::ConfigurationError(format!("{} is not set", name)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("registerblast=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .base_url(env("REGISTERBLAST_URL")?)?
        .api_key(env("REGISTERBLAST_API_KEY")?)
        .credentials(env("REGISTERBLAST_USERNAME")?, env("REGISTERBLAST_PASSWORD")?)
        .build()?;
    let campus_key = env("REGISTERBLAST_CAMPUS")?;

    println!("=== Login ===");
    client.login().await?;
    let session = client.session().await;
    println!("Token expires at: {:?}", session.expires_at);
    println!();

    println!("=== Campus Details ===");
    let campus = client.get_campus_details(&campus_key).await?;
    println!("Name: {:?}", campus.data.name);
    println!("City: {:?}, {:?}", campus.data.city, campus.data.state);
    println!("Request latency: {:?}", campus.latency);
    println!();

    println!("=== Exam Groups ===");
    let groups = client.get_exam_groups(&campus_key).await?;
    for group in groups.data.iter().take(5) {
        println!("  {} {:?}", group.id, group.fullname);
    }
    println!();

    let Some(first) = groups.data.first() else {
        println!("No exam groups configured");
        return Ok(());
    };

    println!("=== Availability ===");
    let availability = client
        .get_availability(&AvailabilityQuery {
            start_date: "2021-02-24T05:00:00.000".to_string(),
            end_date: "2021-02-25T04:59:59.000Z".to_string(),
            exam_groups: vec![first.id],
            duration: 60,
        })
        .await?;
    println!("Open slots: {}", availability.data.availability.len());
    println!("Sent {} time(s)", availability.attempts);

    Ok(())
}
