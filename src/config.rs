//! Plain configuration record for building a [`Client`](crate::Client).

use crate::client::ClientBuilder;
use crate::Result;
use serde::Deserialize;

/// Client construction options.
///
/// Deserializes from the provider's customary camelCase keys, so it can be
/// loaded from a JSON or TOML settings file.
///
/// ```
/// use registerblast::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{
///     "url": "https://www.registerblast.com/spv2",
///     "apiKey": "valid",
///     "username": "admin",
///     "password": "password"
/// }"#).unwrap();
/// assert_eq!(config.api_key, "valid");
/// assert!(config.token.is_none());
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Root of the provider's REST surface.
    pub url: String,
    /// Sent as the `apikey` header on every request.
    pub api_key: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Pre-issued token, used until it expires.
    #[serde(default)]
    pub token: Option<String>,
}

impl ClientConfig {
    /// Converts the record into a builder for further tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid URL.
    pub fn into_builder(self) -> Result<ClientBuilder> {
        let mut builder = ClientBuilder::new().base_url(&self.url)?.api_key(self.api_key);
        if let (Some(username), Some(password)) = (self.username, self.password) {
            builder = builder.credentials(username, password);
        }
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        Ok(builder)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
