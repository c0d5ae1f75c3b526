//! Contact form and its hand-off to the mail relay.

pub mod relay;

use serde::Serialize;
use thiserror::Error;

pub use relay::{EmailJsRelay, MailRelay, RelayError};

pub const MSG_SENT: &str = "Message sent successfully! Thank you for reaching out.";
pub const MSG_MISSING_FIELDS: &str = "Please fill in all required fields.";
pub const MSG_NOT_CONFIGURED: &str = "Email service not configured. Please check your .env file.";
pub const MSG_FAILED: &str = "Failed to send message. Please try again or contact directly via email.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Subject,
        ContactField::Message,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Your Name",
            ContactField::Email => "Your Email",
            ContactField::Subject => "Subject",
            ContactField::Message => "Your Message",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ContactField::Subject)
    }

    pub fn next(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Subject,
            ContactField::Subject => ContactField::Message,
            ContactField::Message => ContactField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Message,
            ContactField::Email => ContactField::Name,
            ContactField::Subject => ContactField::Email,
            ContactField::Message => ContactField::Subject,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please fill in all required fields.")]
    MissingFields(Vec<ContactField>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Subject => &self.subject,
            ContactField::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Subject => &mut self.subject,
            ContactField::Message => &mut self.message,
        }
    }

    /// Name, email and message must be non-blank.
    pub fn validate(&self) -> Result<(), ContactError> {
        let missing: Vec<ContactField> = ContactField::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.field(*f).trim().is_empty())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContactError::MissingFields(missing))
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(String),
}

impl SubmitStatus {
    /// Text shown under the form, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmitStatus::Idle => None,
            SubmitStatus::Sending => Some("Sending..."),
            SubmitStatus::Sent => Some(MSG_SENT),
            SubmitStatus::Failed(msg) => Some(msg.as_str()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmitStatus::Failed(_))
    }
}

impl From<Result<(), RelayError>> for SubmitStatus {
    fn from(result: Result<(), RelayError>) -> Self {
        match result {
            Ok(()) => SubmitStatus::Sent,
            Err(RelayError::NotConfigured) => SubmitStatus::Failed(MSG_NOT_CONFIGURED.to_string()),
            Err(_) => SubmitStatus::Failed(MSG_FAILED.to_string()),
        }
    }
}

/// Validate and send the form, clearing it after a successful send.
pub async fn submit<R: MailRelay>(relay: &R, form: &mut ContactForm) -> SubmitStatus {
    if form.validate().is_err() {
        return SubmitStatus::Failed(MSG_MISSING_FIELDS.to_string());
    }
    let status = SubmitStatus::from(relay.send(form).await);
    if status == SubmitStatus::Sent {
        form.clear();
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRelay {
        sent: AtomicUsize,
        fail_with: Option<fn() -> RelayError>,
    }

    impl MailRelay for CountingRelay {
        async fn send(&self, _form: &ContactForm) -> Result<(), RelayError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }
    }

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: String::new(),
            message: "Hello".to_string(),
        }
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(filled().validate().is_ok());

        let form = ContactForm {
            name: "  ".to_string(),
            message: String::new(),
            ..filled()
        };
        assert_eq!(
            form.validate(),
            Err(ContactError::MissingFields(vec![ContactField::Name, ContactField::Message]))
        );
    }

    #[tokio::test]
    async fn test_submit_success_resets_form() {
        let relay = CountingRelay { sent: AtomicUsize::new(0), fail_with: None };
        let mut form = filled();
        assert_eq!(submit(&relay, &mut form).await, SubmitStatus::Sent);
        assert_eq!(form, ContactForm::default());
        assert_eq!(SubmitStatus::Sent.message(), Some(MSG_SENT));
    }

    #[tokio::test]
    async fn test_submit_missing_fields_skips_relay() {
        let relay = CountingRelay { sent: AtomicUsize::new(0), fail_with: None };
        let mut form = ContactForm::default();
        let status = submit(&relay, &mut form).await;
        assert_eq!(status.message(), Some(MSG_MISSING_FIELDS));
        assert_eq!(relay.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_failures_keep_form() {
        let relay = CountingRelay {
            sent: AtomicUsize::new(0),
            fail_with: Some(|| RelayError::NotConfigured),
        };
        let mut form = filled();
        let status = submit(&relay, &mut form).await;
        assert_eq!(status.message(), Some(MSG_NOT_CONFIGURED));
        assert_eq!(form, filled());

        let relay = CountingRelay {
            sent: AtomicUsize::new(0),
            fail_with: Some(|| RelayError::Rejected { status: 400, body: "bad".to_string() }),
        };
        let status = submit(&relay, &mut form).await;
        assert!(status.is_error());
        assert_eq!(status.message(), Some(MSG_FAILED));
    }

    #[test]
    fn test_field_cycle() {
        for field in ContactField::ALL {
            assert_eq!(field.next().prev(), field);
        }
        assert!(!ContactField::Subject.is_required());
    }
}
