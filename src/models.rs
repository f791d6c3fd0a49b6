//! Typed payloads exchanged with the provider.
//!
//! Provider payloads are loosely specified, so most fields are optional and
//! unknown fields are kept in `extra` where the provider is known to add them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An exam group configured for a campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamGroup {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub parentid: Option<u64>,
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOutcome {
    /// `"success"` or `"error"`.
    pub cancel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CancelOutcome {
    pub const SUCCESS: &'static str = "success";

    pub fn is_success(&self) -> bool {
        self.cancel == Self::SUCCESS
    }
}

/// A single exam booked within an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentItem {
    #[serde(default)]
    pub examid: Option<u64>,
    #[serde(default)]
    pub examname: Option<String>,
    /// Unix timestamp, seconds.
    #[serde(default)]
    pub examdate: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub noshow: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub campusamount: Option<f64>,
    #[serde(default)]
    pub partneramount: Option<f64>,
    #[serde(default)]
    pub registerblastamount: Option<f64>,
    #[serde(default)]
    pub refund: Option<f64>,
    #[serde(default)]
    pub incidents: Vec<Value>,
}

/// Appointment detail record, returned by both the read and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(default)]
    pub totalamount: Option<f64>,
    /// Unix timestamp, seconds.
    #[serde(default)]
    pub registrationdate: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<AppointmentItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Campus properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub campuskey: Option<Value>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rbfee: Option<f64>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    /// HTML snippet shown to candidates about cancelling.
    #[serde(default)]
    pub canceltext: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Availability search parameters.
///
/// Dates are passed through as the provider expects them; both
/// `2021-02-24T05:00:00.000` and `2021-02-25T04:59:59.000Z` are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
    pub exam_groups: Vec<u64>,
    /// Exam length in minutes.
    pub duration: u32,
}

/// Availability search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub availability: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_availability_query_wire_names() {
        let query = AvailabilityQuery {
            start_date: "2021-02-24T05:00:00.000".to_string(),
            end_date: "2021-02-25T04:59:59.000Z".to_string(),
            exam_groups: vec![258312],
            duration: 60,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "startDate": "2021-02-24T05:00:00.000",
                "endDate": "2021-02-25T04:59:59.000Z",
                "examGroups": [258312],
                "duration": 60
            })
        );
    }

    #[test]
    fn test_campus_details_keeps_numeric_key() {
        let details: CampusDetails = serde_json::from_value(json!({
            "name": "Moorhead",
            "campuskey": 351,
            "rbfee": 0,
            "zip": "38761",
            "timezone": "America/Chicago"
        }))
        .unwrap();
        assert_eq!(details.campuskey, Some(json!(351)));
        assert_eq!(details.rbfee, Some(0.0));
        assert_eq!(details.extra.get("timezone"), Some(&json!("America/Chicago")));
    }

    #[test]
    fn test_appointment_details_items() {
        let details: AppointmentDetails = serde_json::from_value(json!({
            "totalamount": 0,
            "registrationdate": 1487367351,
            "email": "dbertucc@email",
            "firstname": "David",
            "lastname": "Smith",
            "status": "approved",
            "items": [{
                "campusamount": 0,
                "examdate": 1490794200,
                "deleted": false,
                "examid": 49809,
                "examname": "SmarterProctoring",
                "noshow": false,
                "notes": null,
                "partneramount": 0,
                "refund": 0,
                "registerblastamount": 0,
                "incidents": []
            }]
        }))
        .unwrap();
        assert_eq!(details.status.as_deref(), Some("approved"));
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].examid, Some(49809));
        assert!(details.items[0].notes.is_none());
    }

    #[test]
    fn test_cancel_outcome() {
        let ok: CancelOutcome = serde_json::from_value(json!({ "cancel": "success" })).unwrap();
        assert!(ok.is_success());
        let refused: CancelOutcome = serde_json::from_value(json!({
            "cancel": "error",
            "message": "This registration may not be canceled online at this time."
        }))
        .unwrap();
        assert!(!refused.is_success());
    }
}
