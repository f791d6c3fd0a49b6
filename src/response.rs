//! Response wrapper that keeps the raw provider reply next to the parsed data.

use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A successful provider response.
///
/// Carries the decoded data together with the raw body, status, headers,
/// total latency and the number of sends it took (more than one when the
/// token was refreshed mid-call).
///
/// # Examples
///
/// ```no_run
/// use registerblast::Client;
///
/// # async fn example() -> Result<(), registerblast::Error> {
/// let client = Client::builder()
///     .base_url("https://www.registerblast.com/spv2")?
///     .api_key("my-key")
///     .credentials("admin", "password")
///     .build()?;
///
/// let response = client.get_campus_details("moorhead").await?;
///
/// println!("Campus: {:?}", response.data.name);
/// println!("Request took {:?}", response.latency);
/// if response.was_retried() {
///     println!("Token was refreshed mid-call");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body, exactly as the provider sent it.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the start of the call until the successful response,
    /// including any login and refresh exchanges.
    pub latency: Duration,

    /// Number of times the request was sent.
    ///
    /// `1` unless the token was rejected as expired and the request resent.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Transforms the data while keeping the response metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use registerblast::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     1,
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the request was resent after a token refresh.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// ```
    /// # use registerblast::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-request-id", HeaderValue::from_static("abc"));
    /// let response = Response::new((), String::new(), StatusCode::OK, headers, Duration::ZERO, 1);
    /// assert_eq!(response.header("x-request-id"), Some("abc"));
    /// assert_eq!(response.header("missing"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl Response<Value> {
    /// Decodes the JSON data into `T`, keeping the response metadata.
    pub(crate) fn decode<T: DeserializeOwned>(self) -> Result<Response<T>> {
        let Response {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        } = self;

        match serde_json::from_value::<T>(data) {
            Ok(data) => Ok(Response::new(
                data, raw_body, status, headers, latency, attempts,
            )),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw_body,
                    "Failed to deserialize response"
                );
                Err(Error::DeserializationFailed {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
