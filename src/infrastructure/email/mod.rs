//! Email delivery port
//!
//! Two implementations behind one capability: the HTTP API provider is
//! preferred, SMTP is the fallback. The choice is made once at startup
//! from configuration, never per call.

mod http;
mod smtp;

pub use http::HttpApiMailer;
pub use smtp::SmtpMailer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::DomainResult;

/// An attachment, content already base64-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64 content
    pub content: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// A message to deliver.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message, returning the provider's message id when it has one.
    async fn send(&self, email: &OutgoingEmail) -> DomainResult<String>;
}

/// Pick the mailer implied by configuration: HTTP API first, SMTP second,
/// none when neither is configured.
pub fn build_mailer(http: reqwest::Client, config: &EmailConfig) -> Option<Arc<dyn Mailer>> {
    if let (Some(api_key), Some(from)) = (&config.api_key, &config.from) {
        return Some(Arc::new(HttpApiMailer::new(
            http,
            config.api_url.clone(),
            api_key.clone(),
            from.clone(),
        )));
    }
    if let (Some(host), Some(user), Some(pass), Some(from)) = (
        &config.smtp_host,
        &config.smtp_user,
        &config.smtp_pass,
        &config.smtp_from,
    ) {
        match SmtpMailer::new(host, config.smtp_port, user, pass, from) {
            Ok(mailer) => return Some(Arc::new(mailer)),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP mailer misconfigured, email disabled");
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_mailer_without_configuration() {
        let cfg = EmailConfig::default();
        assert!(build_mailer(reqwest::Client::new(), &cfg).is_none());
    }

    #[test]
    fn http_provider_wins_when_both_configured() {
        let cfg = EmailConfig {
            api_key: Some("re_123".to_string()),
            api_url: "https://api.resend.com".to_string(),
            from: Some("Flats <reservas@example.com>".to_string()),
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_port: 587,
            smtp_user: Some("u".to_string()),
            smtp_pass: Some("p".to_string()),
            smtp_from: Some("reservas@example.com".to_string()),
        };
        assert!(build_mailer(reqwest::Client::new(), &cfg).is_some());
    }
}
