use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MISSING_FIELDS_MESSAGE: &str = "Name, email, and message are required.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const INVALID_RESPONSE_MESSAGE: &str =
    "Received an invalid (non-JSON) response from the server. Please check server logs.";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Could not connect to the submission server. Please check your internet connection or try again later.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("missing_fields")]
    MissingFields,
    #[error("invalid_email")]
    InvalidEmail,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => MISSING_FIELDS_MESSAGE,
            ValidationError::InvalidEmail => INVALID_EMAIL_MESSAGE,
        }
    }
}

/// Every way a single submit attempt can end short of success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("non-JSON response body (status {status})")]
    ResponseParse { status: u16 },
    #[error("server rejected submission (status {status}): {message}")]
    Application { status: u16, message: String },
    #[error("request never completed: {reason}")]
    Transport { reason: String },
}

impl SubmissionError {
    pub fn user_message(&self) -> &str {
        match self {
            SubmissionError::Validation(err) => err.user_message(),
            SubmissionError::ResponseParse { .. } => INVALID_RESPONSE_MESSAGE,
            SubmissionError::Application { message, .. } => message,
            SubmissionError::Transport { .. } => TRANSPORT_FAILURE_MESSAGE,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmissionError::Validation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("required page element not found: {element}")]
    MissingElement { element: &'static str },
}
