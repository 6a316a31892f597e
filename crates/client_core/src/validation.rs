use std::sync::LazyLock;

use regex::Regex;
use shared::{domain::FormSubmission, error::ValidationError};

// Quoted or dot-atom local part; dotted domain with a 2+ letter TLD, or a
// bracketed IPv4 literal.
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    RE_EMAIL.is_match(&email.to_lowercase())
}

/// Required fields are checked before the address format. Values are not
/// trimmed: a whitespace-only name counts as present.
pub fn validate_submission(submission: &FormSubmission) -> Result<(), ValidationError> {
    if !submission.has_required_fields() {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&submission.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
