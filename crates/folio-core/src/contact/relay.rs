//! Transactional email relay.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use super::ContactForm;
use crate::config::RelayConfig;
use crate::utils::truncate_string;

/// HTTP request timeout in seconds.
/// Sending mail is a single small POST; 20s covers a slow relay.
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Maximum length for relay error bodies kept in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 300;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Mail relay is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Relay rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Hands a completed contact form to an external mail service.
pub trait MailRelay: Send + Sync + 'static {
    fn send(&self, form: &ContactForm) -> impl Future<Output = Result<(), RelayError>> + Send;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// Template variables, named after the form's fields.
#[derive(Serialize)]
struct TemplateParams<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// EmailJS REST client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct EmailJsRelay {
    client: Client,
    config: RelayConfig,
}

impl EmailJsRelay {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }
        Some((
            non_empty(&self.config.service_id)?,
            non_empty(&self.config.template_id)?,
            non_empty(&self.config.public_key)?,
        ))
    }
}

impl MailRelay for EmailJsRelay {
    async fn send(&self, form: &ContactForm) -> Result<(), RelayError> {
        let Some((service_id, template_id, user_id)) = self.credentials() else {
            error!("Mail relay identifiers missing; set EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY");
            return Err(RelayError::NotConfigured);
        };

        let body = SendRequest {
            service_id,
            template_id,
            user_id,
            template_params: TemplateParams {
                name: &form.name,
                email: &form.email,
                subject: &form.subject,
                message: &form.message,
            },
        };

        debug!(endpoint = %self.config.endpoint, "Sending contact message");
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Contact message sent");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let err = RelayError::Rejected {
            status: status.as_u16(),
            body: truncate_string(&text, MAX_ERROR_BODY_LENGTH),
        };
        error!(error = %err, "Mail relay rejected message");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> RelayConfig {
        RelayConfig {
            service_id: Some("service_abc".to_string()),
            template_id: Some("template_xyz".to_string()),
            public_key: Some("pk_123".to_string()),
            endpoint: format!("{}/api/v1.0/email/send", server.uri()),
        }
    }

    fn form() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1.0/email/send"))
            .and(body_json(json!({
                "service_id": "service_abc",
                "template_id": "template_xyz",
                "user_id": "pk_123",
                "template_params": {
                    "name": "Ada",
                    "email": "ada@example.com",
                    "subject": "Hi",
                    "message": "Hello there"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let relay = EmailJsRelay::new(config(&server)).expect("client");
        relay.send(&form()).await.expect("sent");
    }

    #[tokio::test]
    async fn test_rejection_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("The user_id parameter is required"))
            .mount(&server)
            .await;

        let relay = EmailJsRelay::new(config(&server)).expect("client");
        let err = relay.send(&form()).await.expect_err("rejected");
        match err {
            RelayError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("user_id"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let relay = EmailJsRelay::new(RelayConfig {
            public_key: Some(String::new()),
            ..config(&server)
        })
        .expect("client");
        assert!(!relay.is_configured());
        assert!(matches!(relay.send(&form()).await, Err(RelayError::NotConfigured)));
    }
}
