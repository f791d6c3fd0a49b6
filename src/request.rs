//! Outbound request descriptions.

use crate::endpoint::Endpoint;
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// Everything needed to send one request, minus authentication.
///
/// The dispatcher attaches the `apikey` and `authorization` headers on every
/// send, so a description can be resent unchanged after a token refresh.
#[derive(Debug, Clone)]
pub struct RequestDescription {
    /// The routing-table entry this request targets.
    pub endpoint: Endpoint,

    /// Decoded path segments, appended under the base URL.
    pub segments: Vec<String>,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Optional body.
    pub body: Option<RequestBody>,
}

impl RequestDescription {
    /// Creates a description for `endpoint`, rendering its path template from `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if a path placeholder has no matching parameter.
    pub fn new(endpoint: Endpoint, params: &[(&str, &str)]) -> Result<Self> {
        Ok(Self {
            endpoint,
            segments: endpoint.segments(params)?,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    pub fn method(&self) -> Method {
        self.endpoint.method()
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let json =
            serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.body = Some(RequestBody::Json(json));
        Ok(self)
    }

    /// Attaches a form-encoded body.
    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Resolves the full URL under `base`, keeping any path prefix `base` carries.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` cannot carry a path (e.g. `mailto:` URLs).
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                Error::ConfigurationError(format!("Base URL {} cannot have a path", base))
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_keeps_base_path() {
        let base = Url::parse("https://www.registerblast.com/spv2").unwrap();
        let request =
            RequestDescription::new(Endpoint::CampusProperties, &[("campusKey", "moorhead")])
                .unwrap();
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "https://www.registerblast.com/spv2/campus/moorhead/properties"
        );
    }

    #[test]
    fn test_url_with_trailing_slash_base() {
        let base = Url::parse("http://localhost:8000/").unwrap();
        let request = RequestDescription::new(Endpoint::Login, &[]).unwrap();
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "http://localhost:8000/login"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let request = RequestDescription::new(
            Endpoint::AppointmentDetails,
            &[("campusKey", "a b"), ("appointmentId", "1/2")],
        )
        .unwrap();
        assert_eq!(
            request.url(&base).unwrap().as_str(),
            "http://localhost:8000/campus/a%20b/appointments/1%2F2"
        );
    }

    #[test]
    fn test_with_json_body() {
        let request = RequestDescription::new(Endpoint::Availability, &[])
            .unwrap()
            .with_json(&json!({ "duration": 60 }))
            .unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({ "duration": 60 })))
        );
    }

    #[test]
    fn test_with_form_and_header() {
        let request = RequestDescription::new(Endpoint::Login, &[])
            .unwrap()
            .with_form(vec![("username".to_string(), "admin".to_string())])
            .with_header("x-trace", "abc")
            .unwrap();
        assert_eq!(request.headers.get("x-trace").unwrap(), "abc");
        assert!(matches!(request.body, Some(RequestBody::Form(ref f)) if f.len() == 1));

        let invalid = RequestDescription::new(Endpoint::Login, &[])
            .unwrap()
            .with_header("bad header", "x");
        assert!(matches!(invalid, Err(Error::ConfigurationError(_))));
    }
}
