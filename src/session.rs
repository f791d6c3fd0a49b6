//! Session lifecycle: login exchange, token cache and validity checks.
//!
//! The provider issues short-lived tokens in exchange for a username and
//! password. The [`SessionManager`] caches the current token with its expiry
//! and hands out a valid one on demand, logging in again when needed.
//!
//! All session reads and writes go through one async mutex. Callers that find
//! the token unusable at the same time queue on the lock, and only the first
//! performs the login; the rest pick up the token it stored.

use crate::endpoint::Endpoint;
use crate::request::RequestDescription;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// How long a freshly issued token is honoured by the provider.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(15 * 60);

/// Header carrying the client's API key on every request.
pub(crate) const API_KEY_HEADER: &str = "apikey";

/// Connection details and login credentials, fixed for a client's lifetime.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub base_url: Url,
    pub api_key: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Snapshot of the cached token.
///
/// If `token` is set, `expires_at` is set too and marks the instant after
/// which the token must not be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns the token if it is still usable at `now`.
    pub fn token_at(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at)) if now <= expires_at => Some(token),
            _ => None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token_at(now).is_some()
    }

    /// Returns `true` if a token is stored and has not yet expired.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

pub(crate) struct SessionManager {
    http_client: reqwest::Client,
    credentials: Credentials,
    validity: TimeDelta,
    timeout: Option<Duration>,
    state: Mutex<Session>,
}

impl SessionManager {
    pub fn new(
        http_client: reqwest::Client,
        credentials: Credentials,
        validity: TimeDelta,
        timeout: Option<Duration>,
        initial: Session,
    ) -> Self {
        Self {
            http_client,
            credentials,
            validity,
            timeout,
            state: Mutex::new(initial),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.credentials.base_url
    }

    /// Starts a request on the shared HTTP client with the `apikey` header
    /// and the configured timeout applied.
    pub fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, url)
            .header(API_KEY_HEADER, self.credentials.api_key.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.clone()
    }

    /// Performs a login exchange unconditionally.
    pub async fn login(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.exchange(&mut state).await.map(|_| ())
    }

    /// Returns the cached token, logging in first if it is missing or expired.
    pub async fn valid_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.token_at(Utc::now()) {
            return Ok(token.to_string());
        }

        tracing::debug!("Token missing or expired, logging in");
        self.exchange(&mut state).await
    }

    /// Replaces a token the provider reported as expired.
    ///
    /// If another call already swapped `rejected` for a token that is still
    /// valid, that token is returned without a new login.
    pub async fn refresh(&self, rejected: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.token_at(Utc::now()) {
            if token != rejected {
                tracing::debug!("Token already refreshed by a concurrent call");
                return Ok(token.to_string());
            }
        }

        self.exchange(&mut state).await
    }

    /// Sends the credentials to the login endpoint and stores the issued token.
    ///
    /// `state` is left untouched on every failure path.
    async fn exchange(&self, state: &mut Session) -> Result<String> {
        let (username, password) = match (&self.credentials.username, &self.credentials.password)
        {
            (Some(username), Some(password)) => (username, password),
            _ => {
                return Err(Error::ConfigurationError(
                    "Username and password are required to log in".to_string(),
                ))
            }
        };

        let url = RequestDescription::new(Endpoint::Login, &[])?.url(&self.credentials.base_url)?;
        tracing::debug!(url = %url, "Sending login request");

        let response = self
            .request(Endpoint::Login.method(), url)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await
            .map_err(Error::from_transport)?;
        let status = response.status();
        let raw_body = response.text().await.map_err(Error::from_transport)?;

        let body: LoginResponse = serde_json::from_str(&raw_body).map_err(|e| {
            tracing::error!(
                error = %e,
                status = status.as_u16(),
                raw_response = %raw_body,
                "Failed to deserialize login response"
            );
            Error::DeserializationFailed {
                raw_response: raw_body.clone(),
                serde_error: e.to_string(),
                status,
            }
        })?;

        match body {
            LoginResponse {
                success: true,
                token: Some(token),
                ..
            } => {
                let expires_at = Utc::now() + self.validity;
                state.token = Some(token.clone());
                state.expires_at = Some(expires_at);
                tracing::info!(expires_at = %expires_at, "Login succeeded");
                Ok(token)
            }
            LoginResponse { error, .. } => {
                tracing::error!(
                    status = status.as_u16(),
                    error = ?error,
                    "Login rejected by provider"
                );
                Err(Error::Authentication("Login failed".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            token: Some(token.to_string()),
            expires_at: Some(expires_at),
        }
    }

    #[test]
    fn test_empty_session_is_invalid() {
        assert!(!Session::default().is_valid());
    }

    #[test]
    fn test_token_without_expiry_is_invalid() {
        let session = Session {
            token: Some("abc".to_string()),
            expires_at: None,
        };
        assert!(!session.is_valid());
    }

    #[test]
    fn test_validity_boundary_is_inclusive() {
        let now = Utc::now();
        let session = session("abc", now);
        assert!(session.is_valid_at(now));
        assert!(!session.is_valid_at(now + TimeDelta::milliseconds(1)));
        assert_eq!(session.token_at(now - TimeDelta::minutes(1)), Some("abc"));
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let credentials = Credentials {
            base_url: Url::parse("http://localhost:8000").unwrap(),
            api_key: "secret-key".to_string(),
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("secret-key"));
        assert!(!rendered.contains("hunter2"));
    }
}
