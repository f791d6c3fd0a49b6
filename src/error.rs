//! Error types for RegisterBlast API calls.
//!
//! Every failure path of the client ends in one of these variants. Errors that
//! originate from a provider response keep the raw body (and, when it parsed,
//! the JSON payload) so callers can inspect exactly what the provider said.

use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// The main error type for RegisterBlast API calls.
///
/// # Examples
///
/// ```no_run
/// use registerblast::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://www.registerblast.com/spv2")?
///     .api_key("my-key")
///     .credentials("admin", "password")
///     .build()?;
///
/// match client.cancel_appointment("campus", "12345").await {
///     Ok(response) => println!("Cancelled: {:?}", response.data),
///     Err(Error::Business { payload }) => eprintln!("Provider refused: {}", payload),
///     Err(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {}: {}", status, raw_response);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A caller-supplied argument failed a local shape check.
    ///
    /// Raised before any network access. `field` is the wire name of the
    /// offending argument (`campusKey`, `examGroups`, ...).
    #[error("{message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// Human-readable description naming the field.
        message: String,
    },

    /// The provider rejected the login exchange.
    ///
    /// A bad API key and bad credentials are indistinguishable here.
    #[error("{0}")]
    Authentication(String),

    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request exceeded the configured transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be parsed as the expected JSON.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The provider reported a semantic error inside a successful response.
    ///
    /// This covers bodies carrying an `error` field (including an `Expired`
    /// token once the retry budget is spent) and cancellations that did not
    /// succeed. `payload` is the full JSON body.
    #[error("Provider error: {payload}")]
    Business {
        /// The raw JSON body returned by the provider
        payload: Value,
    },

    /// The provider responded with a status of 400 or above.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The body parsed as JSON, when it was JSON
        payload: Option<Value>,
        /// The response headers
        headers: HeaderMap,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` for network failures, timeouts and unparsable bodies.
    ///
    /// ```
    /// use registerblast::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::DeserializationFailed {
    ///     raw_response: "done".to_string(),
    ///     serde_error: "expected value".to_string(),
    ///     status: StatusCode::OK,
    /// };
    /// assert!(err.is_transport());
    /// assert!(!Error::Authentication("Login failed".to_string()).is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout | Error::DeserializationFailed { .. }
        )
    }

    /// Returns `true` if this is a provider report that the token has expired.
    pub fn is_expired_token(&self) -> bool {
        match self {
            Error::Business { payload } => is_expired_signal(payload),
            _ => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the JSON payload the provider sent with a business or HTTP error.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Error::Business { payload } => Some(payload),
            Error::HttpError { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Maps a reqwest failure into the transport class, splitting out timeouts.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

/// The `error` value the provider uses for a token past its validity window.
pub(crate) const EXPIRED_SIGNAL: &str = "Expired";

pub(crate) fn is_expired_signal(body: &Value) -> bool {
    body.get("error").and_then(Value::as_str) == Some(EXPIRED_SIGNAL)
}

/// A specialized `Result` type for RegisterBlast API calls.
pub type Result<T> = std::result::Result<T, Error>;
