//! SMTP mailer fallback

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::{DomainError, DomainResult};

use super::{Mailer, OutgoingEmail};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        from: &str,
    ) -> DomainResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DomainError::upstream("email", format!("smtp relay: {}", e)))?
            .port(port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();
        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> DomainResult<Message> {
        let builder = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| DomainError::upstream("email", format!("bad from address: {}", e)))?)
            .to(email
                .to
                .parse()
                .map_err(|e| DomainError::upstream("email", format!("bad to address: {}", e)))?)
            .subject(&email.subject);

        let body = match &email.html {
            Some(html) => MultiPart::alternative_plain_html(email.text.clone(), html.clone()),
            None => MultiPart::mixed().singlepart(SinglePart::plain(email.text.clone())),
        };

        let mut mixed = MultiPart::mixed().multipart(body);
        for att in &email.attachments {
            let content = BASE64
                .decode(&att.content)
                .map_err(|e| DomainError::upstream("email", format!("bad attachment: {}", e)))?;
            let mime = ContentType::parse(&att.mime_type)
                .unwrap_or(ContentType::parse("application/octet-stream").expect("valid mime"));
            mixed = mixed.singlepart(Attachment::new(att.filename.clone()).body(content, mime));
        }

        builder
            .multipart(mixed)
            .map_err(|e| DomainError::upstream("email", format!("build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> DomainResult<String> {
        debug!(to = %email.to, subject = %email.subject, "sending email via SMTP");
        let message = self.build_message(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| DomainError::upstream("email", e.to_string()))?;
        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}
