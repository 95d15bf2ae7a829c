//! Google-dialect calendar client
//!
//! Credential exchange is the service-account flow: an RS256-signed
//! assertion is posted to the OAuth token endpoint and exchanged for a
//! short-lived bearer token. Tokens are fetched per operation; webhook
//! traffic is far too low to justify caching them.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CalendarConfig;
use crate::domain::{DomainError, DomainResult};

use super::{CalendarEvent, CalendarGateway, CalendarHold};

const SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

pub struct GoogleCalendarGateway {
    http: reqwest::Client,
    service_account_email: String,
    service_account_key: String,
    timezone: String,
    token_url: String,
    api_base: String,
}

impl GoogleCalendarGateway {
    pub fn new(http: reqwest::Client, config: &CalendarConfig) -> Self {
        Self {
            http,
            service_account_email: config.service_account_email.clone(),
            service_account_key: config.service_account_key.clone(),
            timezone: config.timezone.clone(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }

    /// Override provider endpoints, e.g. to point at a stub server.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into();
        self
    }

    async fn access_token(&self) -> DomainResult<String> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.service_account_email,
            scope: SCOPE,
            aud: &self.token_url,
            iat,
            exp: iat + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.service_account_key.as_bytes())
            .map_err(|e| DomainError::upstream("calendar", format!("bad service key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| DomainError::upstream("calendar", format!("sign assertion: {}", e)))?;

        let resp = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| DomainError::upstream("calendar", e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(
                "calendar",
                format!("token exchange failed with {}: {}", status, detail),
            ));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::upstream("calendar", format!("decode token: {}", e)))?;
        Ok(token.access_token)
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencode(calendar_id)
        )
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn find_hold(&self, hold: &CalendarHold) -> DomainResult<Option<CalendarEvent>> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(self.events_url(&hold.calendar_id))
            .bearer_auth(&token)
            .query(&[
                ("timeMin", hold.start.to_utc().to_rfc3339()),
                ("timeMax", hold.end.to_utc().to_rfc3339()),
                (
                    "privateExtendedProperty",
                    format!("reservaId={}", hold.reservation_id),
                ),
                ("maxResults", "2".to_string()),
                ("singleEvents", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::upstream("calendar", e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(
                "calendar",
                format!("event search failed with {}: {}", status, detail),
            ));
        }

        let list: EventList = resp
            .json()
            .await
            .map_err(|e| DomainError::upstream("calendar", format!("decode events: {}", e)))?;
        Ok(list.items.into_iter().next())
    }

    async fn create_hold(&self, hold: &CalendarHold) -> DomainResult<CalendarEvent> {
        if let Some(existing) = self.find_hold(hold).await? {
            debug!(
                reservation_id = %hold.reservation_id,
                event_id = %existing.id,
                "hold already exists, reusing"
            );
            return Ok(existing);
        }

        let token = self.access_token().await?;
        let body = serde_json::json!({
            "summary": hold.summary,
            "description": hold.description,
            "start": { "dateTime": hold.start.to_rfc3339(), "timeZone": self.timezone },
            "end": { "dateTime": hold.end.to_rfc3339(), "timeZone": self.timezone },
            "extendedProperties": {
                "private": { "reservaId": hold.reservation_id }
            }
        });

        let resp = self
            .http
            .post(self.events_url(&hold.calendar_id))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::upstream("calendar", e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(
                "calendar",
                format!("event creation failed with {}: {}", status, detail),
            ));
        }

        resp.json()
            .await
            .map_err(|e| DomainError::upstream("calendar", format!("decode event: {}", e)))
    }
}

/// Percent-encode a calendar id for use as a path segment.
fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
