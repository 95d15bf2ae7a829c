//! PostgREST-dialect reservation store
//!
//! Talks to the hosted store's `/rest/v1` interface with the service
//! credential on every call. Filters use the PostgREST operators
//! (`eq.`, `in.(...)`); inserts ask for the created representation back.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::config::StoreConfig;
use crate::domain::{DomainError, DomainResult, Reservation, ReservationStatus};

use super::{NewReservation, ReservationStore};

const TABLE: &str = "reservas";
const ACTIVE_STATUSES: &str = "in.(pendente,confirmada,pago)";

pub struct RestReservationStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestReservationStore {
    pub fn new(http: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn headers(&self) -> DomainResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|e| DomainError::upstream("store", format!("bad service key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|e| DomainError::upstream("store", format!("bad service key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn check(resp: reqwest::Response, op: &str) -> DomainResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let detail = resp.text().await.unwrap_or_default();
        Err(DomainError::upstream(
            "store",
            format!("{} failed with {}: {}", op, status, detail),
        ))
    }
}

#[async_trait]
impl ReservationStore for RestReservationStore {
    async fn list_active_for_flat(&self, flat_id: &str) -> DomainResult<Vec<Reservation>> {
        debug!(flat_id, "listing active reservations");
        let resp = self
            .http
            .get(self.table_url())
            .headers(self.headers()?)
            .query(&[
                ("select", "*"),
                ("flat_id", &format!("eq.{}", flat_id)),
                ("status", ACTIVE_STATUSES),
            ])
            .send()
            .await
            .map_err(|e| DomainError::upstream("store", e.to_string()))?;

        let resp = Self::check(resp, "list").await?;
        resp.json::<Vec<Reservation>>()
            .await
            .map_err(|e| DomainError::upstream("store", format!("decode list: {}", e)))
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Reservation>> {
        let resp = self
            .http
            .get(self.table_url())
            .headers(self.headers()?)
            .query(&[("select", "*"), ("id", &format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| DomainError::upstream("store", e.to_string()))?;

        let resp = Self::check(resp, "get").await?;
        let mut rows: Vec<Reservation> = resp
            .json()
            .await
            .map_err(|e| DomainError::upstream("store", format!("decode get: {}", e)))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn insert(&self, row: NewReservation) -> DomainResult<Reservation> {
        let resp = self
            .http
            .post(self.table_url())
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| DomainError::upstream("store", e.to_string()))?;

        let resp = Self::check(resp, "insert").await?;
        let mut rows: Vec<Reservation> = resp
            .json()
            .await
            .map_err(|e| DomainError::upstream("store", format!("decode insert: {}", e)))?;
        if rows.is_empty() {
            return Err(DomainError::upstream(
                "store",
                "insert returned no representation",
            ));
        }
        Ok(rows.remove(0))
    }

    async fn set_status(&self, id: &str, status: ReservationStatus) -> DomainResult<()> {
        debug!(reservation_id = id, status = %status, "patching reservation status");
        let resp = self
            .http
            .patch(self.table_url())
            .headers(self.headers()?)
            .query(&[("id", &format!("eq.{}", id))])
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| DomainError::upstream("store", e.to_string()))?;

        Self::check(resp, "patch").await?;
        Ok(())
    }
}
