//! Contact form submission: validation and the delivery seam.
//!
//! Mail delivery happens outside this service. A [`ContactSink`] receives
//! each validated submission; the default sink only records it in the log.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use confidante_core::error::ConfidanteError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .unwrap()
});

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 10;

pub const SUCCESS_MESSAGE: &str = "Thank you for your message. We'll get back to you soon.";
pub const INVALID_MESSAGE: &str = "Invalid form data";
pub const FAILURE_MESSAGE: &str = "Failed to process your message. Please try again later.";

/// Raw request body. Every field is optional here so that missing fields
/// surface as validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Wire shape of every `/api/contact` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ContactResponse {
    pub fn accepted(recipient_email: impl Into<String>) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            recipient_email: Some(recipient_email.into()),
            errors: None,
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: INVALID_MESSAGE.to_string(),
            recipient_email: None,
            errors: Some(errors),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            message: FAILURE_MESSAGE.to_string(),
            recipient_email: None,
            errors: None,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

impl ContactRequest {
    /// Check every field and collect all violations, in field order.
    pub fn validate(self) -> Result<ContactSubmission, Vec<FieldError>> {
        let mut errors = Vec::new();

        match &self.name {
            None => errors.push(FieldError::new("name", "Required")),
            Some(name) if name.chars().count() < NAME_MIN_CHARS => errors.push(FieldError::new(
                "name",
                "Name must be at least 2 characters",
            )),
            Some(_) => {}
        }

        match &self.email {
            None => errors.push(FieldError::new("email", "Required")),
            Some(email) if !is_valid_email(email) => errors.push(FieldError::new(
                "email",
                "Please enter a valid email address",
            )),
            Some(_) => {}
        }

        match &self.message {
            None => errors.push(FieldError::new("message", "Required")),
            Some(message) if message.chars().count() < MESSAGE_MIN_CHARS => errors.push(
                FieldError::new("message", "Message must be at least 10 characters"),
            ),
            Some(_) => {}
        }

        match (self.name, self.email, self.message) {
            (Some(name), Some(email), Some(message)) if errors.is_empty() => {
                Ok(ContactSubmission {
                    name,
                    email,
                    subject: self.subject,
                    message,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Receives validated contact submissions.
pub trait ContactSink: Send + Sync {
    fn deliver(&self, submission: &ContactSubmission) -> Result<(), ConfidanteError>;
}

/// Records submissions in the log. The message body is never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ContactSink for LogSink {
    fn deliver(&self, submission: &ContactSubmission) -> Result<(), ConfidanteError> {
        tracing::info!(
            name = %submission.name,
            email = %submission.email,
            subject = submission.subject.as_deref().unwrap_or(""),
            message_chars = submission.message.chars().count(),
            "Contact form submission"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: None,
            message: Some(message.into()),
        }
    }

    #[test]
    fn test_valid_submission() {
        let submission = request("Asha", "asha@example.com", "I would like to know more.")
            .validate()
            .unwrap();
        assert_eq!(submission.name, "Asha");
        assert_eq!(submission.subject, None);
    }

    #[test]
    fn test_subject_is_carried_through() {
        let mut req = request("Asha", "asha@example.com", "I would like to know more.");
        req.subject = Some("Workshops".into());
        assert_eq!(req.validate().unwrap().subject.as_deref(), Some("Workshops"));
    }

    #[test]
    fn test_short_fields_rejected() {
        let errors = request("A", "asha@example.com", "too short").validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("name", "Name must be at least 2 characters"),
                FieldError::new("message", "Message must be at least 10 characters"),
            ]
        );
    }

    #[test]
    fn test_lengths_count_characters() {
        // Two characters, more than two bytes.
        assert!(request("Zoë", "z@example.com", "ten chars!").validate().is_ok());
        assert!(request("é", "z@example.com", "ten chars!").validate().is_err());
    }

    #[test]
    fn test_missing_fields_required() {
        let errors = ContactRequest::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
        assert!(errors.iter().all(|e| e.message == "Required"));
    }

    #[test]
    fn test_email_validation() {
        for good in ["a@b.co", "first.last+tag@mail.example.org", "o'neil@example.ie"] {
            assert!(is_valid_email(good), "{good} should be valid");
        }
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            ".user@example.com",
            "us..er@example.com",
            "user.@example.com",
            "user name@example.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(ContactResponse::accepted("team@example.com")).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["recipientEmail"], "team@example.com");
        assert!(ok.get("errors").is_none());

        let failed = serde_json::to_value(ContactResponse::failed()).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["message"], FAILURE_MESSAGE);
        assert!(failed.get("recipientEmail").is_none());

        let invalid = serde_json::to_value(ContactResponse::invalid(vec![])).unwrap();
        assert_eq!(invalid["message"], "Invalid form data");
        assert_eq!(invalid["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_log_sink_accepts() {
        let submission = request("Asha", "asha@example.com", "I would like to know more.")
            .validate()
            .unwrap();
        assert!(LogSink.deliver(&submission).is_ok());
    }
}
