//! RegisterBlast API client.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] (or a
//! [`ClientConfig`](crate::ClientConfig)) to configure and create clients.

use crate::{
    config::ClientConfig,
    dispatch::Dispatcher,
    endpoint::{AuthScheme, Endpoint, RouteTable},
    models::{AppointmentDetails, Availability, CampusDetails, CancelOutcome, ExamGroup},
    request::RequestDescription,
    retry::DEFAULT_RETRY_BUDGET,
    session::{Credentials, Session, SessionManager, TOKEN_VALIDITY},
    validate, Error, Response, Result,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A client for the RegisterBlast exam-scheduling API.
///
/// Every operation checks its arguments, makes sure a valid token is cached
/// (logging in if not), and transparently refreshes the token and resends
/// once if the provider reports it as expired.
///
/// Clones share the same session, so a login performed through one clone is
/// visible to all of them.
///
/// # Examples
///
/// ```no_run
/// use registerblast::{AvailabilityQuery, Client};
///
/// # async fn example() -> Result<(), registerblast::Error> {
/// let client = Client::builder()
///     .base_url("https://www.registerblast.com/spv2")?
///     .api_key("my-key")
///     .credentials("admin", "password")
///     .build()?;
///
/// let groups = client.get_exam_groups("moorhead").await?;
/// println!("{} exam groups", groups.data.len());
///
/// let slots = client
///     .get_availability(&AvailabilityQuery {
///         start_date: "2021-02-24T05:00:00.000".to_string(),
///         end_date: "2021-02-25T04:59:59.000Z".to_string(),
///         exam_groups: vec![258312],
///         duration: 60,
///     })
///     .await?;
/// println!("{} open slots", slots.data.availability.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Dispatcher>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from a plain configuration record.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.into_builder()?.build()
    }

    /// Exchanges the configured credentials for a new token.
    ///
    /// Authenticated operations log in on their own when needed; call this to
    /// authenticate eagerly or to check credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the provider rejects the API key
    /// or credentials. The cached session is left unchanged on failure.
    pub async fn login(&self) -> Result<()> {
        self.inner.session.login().await
    }

    /// Returns a snapshot of the cached session.
    pub async fn session(&self) -> Session {
        self.inner.session.snapshot().await
    }

    /// Returns `true` if a token is cached and has not expired.
    pub async fn is_token_valid(&self) -> bool {
        self.session().await.is_valid()
    }

    /// Returns the `authorization` value `endpoint` would be sent with now,
    /// or `None` if no usable token is cached.
    pub async fn current_auth_header(&self, endpoint: Endpoint) -> Option<String> {
        let session = self.session().await;
        let token = session.token_at(Utc::now())?;
        Some(self.inner.routes.auth_scheme(endpoint).header_value(token))
    }

    /// Sends an arbitrary request through the authenticated dispatcher.
    ///
    /// Used by the named operations; useful for provider endpoints this
    /// crate does not wrap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] for [`Endpoint::Login`], which
    /// is only reachable through [`Client::login`].
    pub async fn call<Res>(&self, request: RequestDescription) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        if request.endpoint == Endpoint::Login {
            return Err(Error::ConfigurationError(
                "Login is not an authenticated endpoint, use Client::login".to_string(),
            ));
        }
        self.inner.dispatch(&request).await?.decode()
    }

    /// Lists the exam groups of a campus.
    pub async fn get_exam_groups(&self, campus_key: &str) -> Result<Response<Vec<ExamGroup>>> {
        validate::CAMPUS.check(&json!({ "campusKey": campus_key }))?;

        let request = RequestDescription::new(Endpoint::ExamGroups, &[("campusKey", campus_key)])?;
        self.call(request).await
    }

    /// Cancels an appointment.
    ///
    /// # Errors
    ///
    /// A reply whose `cancel` field is not `"success"` fails with
    /// [`Error::Business`] carrying the reply. A refusal sent with an error
    /// status fails with [`Error::HttpError`], whose `payload` holds the same
    /// `{cancel, message}` shape.
    pub async fn cancel_appointment(
        &self,
        campus_key: &str,
        appointment_id: &str,
    ) -> Result<Response<CancelOutcome>> {
        validate::APPOINTMENT.check(&json!({
            "campusKey": campus_key,
            "appointmentId": appointment_id,
        }))?;

        let request = RequestDescription::new(
            Endpoint::CancelAppointment,
            &[("campusKey", campus_key), ("appointmentId", appointment_id)],
        )?;
        let response = self.inner.dispatch(&request).await?;

        if response.data.get("cancel").and_then(Value::as_str) != Some(CancelOutcome::SUCCESS) {
            tracing::warn!(
                campus_key = campus_key,
                appointment_id = appointment_id,
                "Cancellation refused"
            );
            return Err(Error::Business {
                payload: response.data,
            });
        }

        response.decode()
    }

    /// Fetches the details of one appointment.
    pub async fn get_appointment_details(
        &self,
        campus_key: &str,
        appointment_id: &str,
    ) -> Result<Response<AppointmentDetails>> {
        validate::APPOINTMENT.check(&json!({
            "campusKey": campus_key,
            "appointmentId": appointment_id,
        }))?;

        let request = RequestDescription::new(
            Endpoint::AppointmentDetails,
            &[("campusKey", campus_key), ("appointmentId", appointment_id)],
        )?;
        self.call(request).await
    }

    /// Updates an appointment with the fields in `body` (sent as JSON).
    ///
    /// `body` must serialize to a JSON object.
    pub async fn update_appointment_details<B>(
        &self,
        campus_key: &str,
        appointment_id: &str,
        body: &B,
    ) -> Result<Response<AppointmentDetails>>
    where
        B: Serialize + ?Sized,
    {
        validate::APPOINTMENT.check(&json!({
            "campusKey": campus_key,
            "appointmentId": appointment_id,
        }))?;
        let body =
            serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        validate::APPOINTMENT_UPDATE.check_value("body", &body)?;

        let request = RequestDescription::new(
            Endpoint::UpdateAppointment,
            &[("campusKey", campus_key), ("appointmentId", appointment_id)],
        )?
        .with_json(&body)?;
        self.call(request).await
    }

    /// Searches open appointment slots.
    ///
    /// `query` is usually an [`AvailabilityQuery`](crate::AvailabilityQuery);
    /// any value serializing to `{startDate, endDate, examGroups, duration}`
    /// is accepted and checked field by field.
    pub async fn get_availability<B>(&self, query: &B) -> Result<Response<Availability>>
    where
        B: Serialize + ?Sized,
    {
        let body =
            serde_json::to_value(query).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        validate::AVAILABILITY.check(&body)?;

        let request = RequestDescription::new(Endpoint::Availability, &[])?.with_json(&body)?;
        self.call(request).await
    }

    /// Fetches the properties of a campus.
    pub async fn get_campus_details(&self, campus_key: &str) -> Result<Response<CampusDetails>> {
        validate::CAMPUS.check(&json!({ "campusKey": campus_key }))?;

        let request =
            RequestDescription::new(Endpoint::CampusProperties, &[("campusKey", campus_key)])?;
        self.call(request).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use registerblast::{AuthScheme, ClientBuilder, Endpoint};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), registerblast::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://www.registerblast.com/spv2")?
///     .api_key("my-key")
///     .credentials("admin", "password")
///     .timeout(Duration::from_secs(30))
///     .auth_scheme(Endpoint::CampusProperties, AuthScheme::Basic)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
    token: Option<(String, Option<DateTime<Utc>>)>,
    token_ttl: Duration,
    retry_budget: u32,
    routes: RouteTable,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            username: None,
            password: None,
            token: None,
            token_ttl: TOKEN_VALIDITY,
            retry_budget: DEFAULT_RETRY_BUDGET,
            routes: RouteTable::new(),
            timeout: None,
        }
    }

    /// Sets the root of the provider's REST surface.
    ///
    /// A path prefix (`https://host/spv2`) is kept; endpoint paths go under it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the API key sent as the `apikey` header. Required.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the credentials used for every login exchange.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Supplies a token issued earlier, skipping the first login.
    ///
    /// The token is treated as issued at build time and expires after the
    /// token lifetime.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some((token.into(), None));
        self
    }

    /// Supplies a token issued earlier together with its expiry instant.
    pub fn token_with_expiry(mut self, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        self.token = Some((token.into(), Some(expires_at)));
        self
    }

    /// Sets how long a freshly issued token is used. Defaults to 15 minutes.
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Sets how many times a call may be sent when the token keeps being
    /// rejected as expired. Defaults to 2.
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Overrides the authorization scheme for one endpoint.
    pub fn auth_scheme(mut self, endpoint: Endpoint, scheme: AuthScheme) -> Self {
        self.routes.set_auth_scheme(endpoint, scheme);
        self
    }

    /// Sets the per-request transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key is missing, or if the
    /// token lifetime is out of range.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| Error::ConfigurationError("API key is required".to_string()))?;
        let validity = TimeDelta::from_std(self.token_ttl)
            .map_err(|e| Error::ConfigurationError(format!("Invalid token lifetime: {}", e)))?;

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let initial = match self.token {
            Some((token, expires_at)) => Session {
                token: Some(token),
                expires_at: Some(expires_at.unwrap_or_else(|| Utc::now() + validity)),
            },
            None => Session::default(),
        };

        let credentials = Credentials {
            base_url,
            api_key,
            username: self.username,
            password: self.password,
        };

        Ok(Client {
            inner: Arc::new(Dispatcher {
                session: SessionManager::new(
                    http_client,
                    credentials,
                    validity,
                    self.timeout,
                    initial,
                ),
                routes: self.routes,
                retry_limit: self.retry_budget,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_base_url() {
        let result = Client::builder().api_key("valid").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_build_requires_api_key() {
        let result = Client::builder()
            .base_url("http://localhost:8000")
            .unwrap()
            .build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_pre_supplied_token_is_valid() {
        let before = Utc::now();
        let client = Client::builder()
            .base_url("http://localhost:8000")
            .unwrap()
            .api_key("valid")
            .token("correctToken")
            .build()
            .unwrap();

        let session = client.session().await;
        assert_eq!(session.token.as_deref(), Some("correctToken"));
        assert!(session.expires_at.unwrap() >= before + TimeDelta::minutes(15));
        assert!(client.is_token_valid().await);
        assert_eq!(
            client.current_auth_header(Endpoint::ExamGroups).await.as_deref(),
            Some("Basic correctToken")
        );
        assert_eq!(
            client.current_auth_header(Endpoint::Availability).await.as_deref(),
            Some("Basic correctToken")
        );
        assert_eq!(
            client.current_auth_header(Endpoint::CampusProperties).await.as_deref(),
            Some("Bearer correctToken")
        );
    }

    #[tokio::test]
    async fn test_expired_pre_supplied_token_is_invalid() {
        let client = Client::builder()
            .base_url("http://localhost:8000")
            .unwrap()
            .api_key("valid")
            .token_with_expiry("stale", Utc::now() - TimeDelta::minutes(1))
            .build()
            .unwrap();

        assert!(!client.is_token_valid().await);
        assert_eq!(client.current_auth_header(Endpoint::ExamGroups).await, None);
    }

    #[tokio::test]
    async fn test_validation_runs_before_login() {
        // No credentials and no reachable server: only local checks can answer.
        let client = Client::builder()
            .base_url("http://127.0.0.1:9")
            .unwrap()
            .api_key("valid")
            .build()
            .unwrap();

        let result = client.get_campus_details("").await;
        assert!(matches!(result, Err(Error::Validation { field: "campusKey", .. })));

        let result = client.cancel_appointment("campus", "").await;
        assert!(matches!(
            result,
            Err(Error::Validation { field: "appointmentId", .. })
        ));

        let result = client
            .update_appointment_details("campus", "42", &vec![1, 2, 3])
            .await;
        assert!(matches!(result, Err(Error::Validation { field: "body", .. })));
    }

    #[tokio::test]
    async fn test_login_without_credentials() {
        let client = Client::builder()
            .base_url("http://127.0.0.1:9")
            .unwrap()
            .api_key("valid")
            .build()
            .unwrap();

        let result = client.login().await;
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
        assert_eq!(client.session().await, Session::default());
    }
}
