//! # registerblast - client for the RegisterBlast exam-scheduling API
//!
//! A typed, async client built on `reqwest`. The provider authenticates with
//! short-lived tokens obtained from a username and password; this crate
//! caches the token, logs in again when it expires, and resends a request
//! once if the provider rejects the token mid-flight.
//!
//! ## Quick Start
//!
//! ```no_run
//! use registerblast::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), registerblast::Error> {
//!     let client = Client::builder()
//!         .base_url("https://www.registerblast.com/spv2")?
//!         .api_key("my-key")
//!         .credentials("admin", "password")
//!         .build()?;
//!
//!     // Logs in on first use.
//!     let campus = client.get_campus_details("moorhead").await?;
//!     println!("Campus: {:?}", campus.data.name);
//!
//!     let cancelled = client.cancel_appointment("moorhead", "12345").await?;
//!     println!("Cancel: {}", cancelled.data.cancel);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sessions
//!
//! Tokens are honoured for 15 minutes after login. Before each call the
//! client checks the cached token and logs in if it is missing or expired.
//! Concurrent calls share one session; when several of them find the token
//! unusable, only one login exchange is made.
//!
//! If the provider answers `{"error": "Expired"}` anyway (clock skew, or the
//! token expiring in flight), the client logs in again and resends. A call is
//! sent at most twice by default; see [`ClientBuilder::retry_budget`].
//!
//! ## Error Handling
//!
//! ```no_run
//! use registerblast::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_url("https://example.com")?.api_key("k").build()?;
//! match client.get_exam_groups("moorhead").await {
//!     Ok(groups) => println!("{} groups", groups.data.len()),
//!     Err(Error::Validation { field, message }) => eprintln!("Bad {}: {}", field, message),
//!     Err(Error::Authentication(reason)) => eprintln!("Login rejected: {}", reason),
//!     Err(Error::Business { payload }) => eprintln!("Provider error: {}", payload),
//!     Err(Error::HttpError { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(e) if e.is_transport() => eprintln!("Transport failure: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatch;
pub mod endpoint;
mod error;
pub mod models;
pub mod request;
mod response;
pub mod retry;
pub mod session;
mod validate;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use endpoint::{AuthScheme, Endpoint, RouteTable};
pub use error::{Error, Result};
pub use models::{
    AppointmentDetails, AppointmentItem, Availability, AvailabilityQuery, CampusDetails,
    CancelOutcome, ExamGroup,
};
pub use request::{RequestBody, RequestDescription};
pub use response::Response;
pub use retry::RetryBudget;
pub use session::{Session, TOKEN_VALIDITY};
