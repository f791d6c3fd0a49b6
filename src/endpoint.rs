//! Routing table for the provider's REST surface.
//!
//! Each [`Endpoint`] knows its HTTP method and path template. The
//! authorization scheme is a per-endpoint setting held in a [`RouteTable`],
//! because the provider does not accept the same scheme everywhere.

use crate::{Error, Result};
use http::Method;
use std::collections::HashMap;
use std::fmt;

/// An endpoint consumed from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /login`
    Login,
    /// `GET /campus/{campusKey}/groups`
    ExamGroups,
    /// `GET /campus/{campusKey}/appointments/{appointmentId}/cancel`
    CancelAppointment,
    /// `GET /campus/{campusKey}/appointments/{appointmentId}`
    AppointmentDetails,
    /// `POST /campus/{campusKey}/appointments/{appointmentId}`
    UpdateAppointment,
    /// `POST /campus/availability`
    Availability,
    /// `GET /campus/{campusKey}/properties`
    CampusProperties,
}

impl Endpoint {
    /// All endpoints, in routing-table order.
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Login,
        Endpoint::ExamGroups,
        Endpoint::CancelAppointment,
        Endpoint::AppointmentDetails,
        Endpoint::UpdateAppointment,
        Endpoint::Availability,
        Endpoint::CampusProperties,
    ];

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Login | Endpoint::UpdateAppointment | Endpoint::Availability => Method::POST,
            Endpoint::ExamGroups
            | Endpoint::CancelAppointment
            | Endpoint::AppointmentDetails
            | Endpoint::CampusProperties => Method::GET,
        }
    }

    pub fn path_template(&self) -> &'static str {
        match self {
            Endpoint::Login => "/login",
            Endpoint::ExamGroups => "/campus/{campusKey}/groups",
            Endpoint::CancelAppointment => "/campus/{campusKey}/appointments/{appointmentId}/cancel",
            Endpoint::AppointmentDetails | Endpoint::UpdateAppointment => {
                "/campus/{campusKey}/appointments/{appointmentId}"
            }
            Endpoint::Availability => "/campus/availability",
            Endpoint::CampusProperties => "/campus/{campusKey}/properties",
        }
    }

    /// Renders the path template into decoded segments.
    ///
    /// `{name}` placeholders are replaced by the matching entry of `params`.
    /// Segments are returned unencoded; URL construction encodes them.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a placeholder has no matching parameter.
    pub fn segments(&self, params: &[(&str, &str)]) -> Result<Vec<String>> {
        self.path_template()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(name) => params
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| value.to_string())
                        .ok_or_else(|| {
                            Error::ConfigurationError(format!(
                                "Missing path parameter {} for {}",
                                name, self
                            ))
                        }),
                    None => Ok(segment.to_string()),
                }
            })
            .collect()
    }

    /// The scheme the provider receives on this endpoint.
    ///
    /// Campus properties is the only endpoint sent with `Bearer`. Login carries
    /// no authorization header, so its entry is never used.
    pub fn default_auth_scheme(&self) -> AuthScheme {
        match self {
            Endpoint::CampusProperties => AuthScheme::Bearer,
            Endpoint::Login
            | Endpoint::ExamGroups
            | Endpoint::CancelAppointment
            | Endpoint::AppointmentDetails
            | Endpoint::UpdateAppointment
            | Endpoint::Availability => AuthScheme::Basic,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path_template())
    }
}

/// Authorization header scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    Basic,
    Bearer,
}

impl AuthScheme {
    /// Formats the `authorization` header value for `token`.
    ///
    /// ```
    /// use registerblast::AuthScheme;
    ///
    /// assert_eq!(AuthScheme::Basic.header_value("abc"), "Basic abc");
    /// assert_eq!(AuthScheme::Bearer.header_value("abc"), "Bearer abc");
    /// ```
    pub fn header_value(&self, token: &str) -> String {
        match self {
            AuthScheme::Basic => format!("Basic {}", token),
            AuthScheme::Bearer => format!("Bearer {}", token),
        }
    }
}

/// Per-endpoint authorization schemes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    schemes: HashMap<Endpoint, AuthScheme>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            schemes: Endpoint::ALL
                .iter()
                .map(|endpoint| (*endpoint, endpoint.default_auth_scheme()))
                .collect(),
        }
    }

    pub fn auth_scheme(&self, endpoint: Endpoint) -> AuthScheme {
        self.schemes
            .get(&endpoint)
            .copied()
            .unwrap_or_else(|| endpoint.default_auth_scheme())
    }

    pub fn set_auth_scheme(&mut self, endpoint: Endpoint, scheme: AuthScheme) {
        self.schemes.insert(endpoint, scheme);
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_substitute_placeholders() {
        let segments = Endpoint::CancelAppointment
            .segments(&[("campusKey", "moorhead"), ("appointmentId", "42")])
            .unwrap();
        assert_eq!(
            segments,
            vec!["campus", "moorhead", "appointments", "42", "cancel"]
        );
    }

    #[test]
    fn test_segments_without_placeholders() {
        let segments = Endpoint::Availability.segments(&[]).unwrap();
        assert_eq!(segments, vec!["campus", "availability"]);
    }

    #[test]
    fn test_missing_parameter_is_configuration_error() {
        let result = Endpoint::ExamGroups.segments(&[]);
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_default_schemes_follow_provider() {
        let table = RouteTable::new();
        assert_eq!(table.auth_scheme(Endpoint::ExamGroups), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::CancelAppointment), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::AppointmentDetails), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::UpdateAppointment), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::Availability), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::CampusProperties), AuthScheme::Bearer);
    }

    #[test]
    fn test_override_scheme() {
        let mut table = RouteTable::new();
        table.set_auth_scheme(Endpoint::CampusProperties, AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::CampusProperties), AuthScheme::Basic);
        assert_eq!(table.auth_scheme(Endpoint::Availability), AuthScheme::Basic);
    }

    #[test]
    fn test_methods() {
        assert_eq!(Endpoint::Login.method(), Method::POST);
        assert_eq!(Endpoint::AppointmentDetails.method(), Method::GET);
        assert_eq!(Endpoint::UpdateAppointment.method(), Method::POST);
    }
}
