//! HTTP API mailer (Resend dialect)

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{DomainError, DomainResult};

use super::{Mailer, OutgoingEmail};

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct HttpApiMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpApiMailer {
    pub fn new(http: reqwest::Client, api_url: String, api_key: String, from: String) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpApiMailer {
    async fn send(&self, email: &OutgoingEmail) -> DomainResult<String> {
        debug!(to = %email.to, subject = %email.subject, "sending email via HTTP provider");
        let body = serde_json::json!({
            "from": self.from,
            "to": [email.to],
            "subject": email.subject,
            "text": email.text,
            "html": email.html,
            "attachments": email.attachments,
        });

        let resp = self
            .http
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::upstream("email", e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(
                "email",
                format!("send failed with {}: {}", status, detail),
            ));
        }

        let sent: SendResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::upstream("email", format!("decode response: {}", e)))?;
        Ok(sent.id.unwrap_or_default())
    }
}
