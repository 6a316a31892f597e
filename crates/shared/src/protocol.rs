use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SubmissionError, GENERIC_FAILURE_MESSAGE};

pub const SUCCESS_MESSAGE: &str =
    "Message received successfully! We'll get back to you within 24-48 hours.";

/// Reply body of the submission endpoint, read leniently by [`ServerResponse::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServerResponse {
    pub fn from_json(value: &Value) -> Self {
        // A `null` body reads as an empty response and ends as a generic
        // application failure, not as a connection error.
        let Value::Object(fields) = value else {
            return Self::default();
        };

        Self {
            success: fields.get("success").is_some_and(is_truthy),
            error: fields.get("error").and_then(truthy_text),
            message: fields.get("message").and_then(truthy_text),
        }
    }

    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_json(&value))
    }

    /// Decides the outcome of a submission. Success needs both a 2xx status
    /// and a truthy `success` flag.
    pub fn verdict(&self, status: u16) -> Result<(), SubmissionError> {
        let status_ok = (200..300).contains(&status);
        if status_ok && self.success {
            return Ok(());
        }

        let message = if let Some(error) = &self.error {
            error.clone()
        } else if let Some(message) = &self.message {
            message.clone()
        } else if !status_ok {
            format!("Server responded with an error: {status}.")
        } else {
            GENERIC_FAILURE_MESSAGE.to_string()
        };

        Err(SubmissionError::Application { status, message })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    Some(coerce_text(value))
}

// String conversion as a browser would print the value.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(coerce_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_fields_with_truthiness() {
        let response = ServerResponse::from_json(&json!({
            "success": 1,
            "error": "",
            "message": "queued"
        }));
        assert!(response.success);
        assert_eq!(response.error, None);
        assert_eq!(response.message.as_deref(), Some("queued"));
    }

    #[test]
    fn non_object_bodies_are_empty_responses() {
        let from_null = ServerResponse::from_json(&json!(null));
        assert_eq!(from_null, ServerResponse::default());
        assert_eq!(
            from_null.verdict(200).expect_err("rejected").user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(ServerResponse::from_json(&json!([1, 2])), ServerResponse::default());
        assert_eq!(ServerResponse::from_json(&json!("ok")), ServerResponse::default());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(ServerResponse::parse(b"<html>oops</html>").is_err());
        assert!(ServerResponse::parse(b"{\"success\":true}").expect("json").success);
    }

    #[test]
    fn success_requires_ok_status_and_flag() {
        let accepted = ServerResponse {
            success: true,
            ..Default::default()
        };
        assert_eq!(accepted.verdict(200), Ok(()));
        assert_eq!(
            accepted.verdict(503),
            Err(SubmissionError::Application {
                status: 503,
                message: "Server responded with an error: 503.".into(),
            })
        );
    }

    #[test]
    fn failure_message_prefers_error_then_message() {
        let response = ServerResponse {
            success: false,
            error: Some("bad captcha".into()),
            message: Some("ignored".into()),
        };
        let err = response.verdict(200).expect_err("rejected");
        assert_eq!(err.user_message(), "bad captcha");

        let response = ServerResponse {
            success: false,
            error: None,
            message: Some("mailbox full".into()),
        };
        let err = response.verdict(500).expect_err("rejected");
        assert_eq!(err.user_message(), "mailbox full");
    }

    #[test]
    fn ok_status_without_success_falls_back_to_generic_message() {
        let err = ServerResponse::default().verdict(200).expect_err("rejected");
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn non_string_fields_are_coerced_like_browser_strings() {
        let response = ServerResponse::from_json(&json!({
            "success": false,
            "error": {"code": 7},
            "message": [1, "two", null, true]
        }));
        assert_eq!(response.error.as_deref(), Some("[object Object]"));
        assert_eq!(response.message.as_deref(), Some("1,two,,true"));

        let response = ServerResponse::from_json(&json!({"success": false, "error": 42}));
        assert_eq!(response.error.as_deref(), Some("42"));
    }
}
