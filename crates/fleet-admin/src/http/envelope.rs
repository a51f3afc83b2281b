//! JSON success/failure envelope.

use std::collections::BTreeMap;

use fleet_forms::ValidationErrors;
use serde::{Deserialize, Serialize};

use super::Response;

/// Body of every JSON answer: `{success, data?, message?, errors?}`.
///
/// The HTTP status travels with the envelope but is not serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request did what it asked for.
    pub success: bool,
    /// Payload of a successful request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field errors, keyed by field name (`__all__` for the whole form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip)]
    status: u16,
}

impl<T> ApiEnvelope<T> {
    fn with_status(status: u16, success: bool) -> Self {
        Self {
            success,
            data: None,
            message: None,
            errors: None,
            status,
        }
    }

    /// A 200 answer carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::with_status(200, true)
        }
    }

    /// A 201 answer carrying the created resource.
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::with_status(201, true)
        }
    }

    /// A 422 answer listing what the submitted data got wrong.
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            message: Some("Please correct the errors below.".to_string()),
            errors: Some(errors.to_map()),
            ..Self::with_status(422, false)
        }
    }

    /// A 500 answer for a failure the client cannot fix.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::with_status(500, false)
        }
    }

    /// Adds a summary message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the HTTP status this envelope is sent with.
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Serializes the envelope into a JSON response.
    pub fn into_response(self) -> Response {
        let status = self.status;
        Response::json(&self).status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body(res: &Response) -> Value {
        serde_json::from_slice(&res.body).unwrap()
    }

    #[test]
    fn test_created() {
        let res = ApiEnvelope::created(json!({"id": "ab12"}))
            .message("Vehicle added.")
            .into_response();
        assert_eq!(res.status, 201);
        assert_eq!(
            body(&res),
            json!({"success": true, "data": {"id": "ab12"}, "message": "Vehicle added."})
        );
    }

    #[test]
    fn test_validation() {
        let mut errors = ValidationErrors::new();
        errors.add("registration", "This field is required.");
        let res = ApiEnvelope::<()>::validation(&errors).into_response();
        assert_eq!(res.status, 422);
        let body = body(&res);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["registration"][0], "This field is required.");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_failure() {
        let envelope = ApiEnvelope::<()>::failure("store unavailable");
        assert_eq!(envelope.status(), 500);
        let res = envelope.into_response();
        assert_eq!(body(&res), json!({"success": false, "message": "store unavailable"}));
    }

    #[test]
    fn test_decodes_without_status() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_str(r#"{"success": true, "data": {"id": "x"}}"#).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!({"id": "x"})));
        assert_eq!(envelope.status(), 0);
    }
}
