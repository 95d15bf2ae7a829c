//! REST client for the payment provider

use async_trait::async_trait;
use tracing::debug;

use crate::config::PaymentConfig;
use crate::domain::{DomainError, DomainResult};

use super::{CheckoutPreference, MerchantOrder, Payment, PaymentGateway, PreferenceRequest};

pub struct RestPaymentGateway {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl RestPaymentGateway {
    pub fn new(http: reqwest::Client, config: &PaymentConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    async fn check(resp: reqwest::Response, op: &str) -> DomainResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let detail = resp.text().await.unwrap_or_default();
        Err(DomainError::upstream(
            "payment",
            format!("{} failed with {}: {}", op, status, detail),
        ))
    }
}

#[async_trait]
impl PaymentGateway for RestPaymentGateway {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> DomainResult<CheckoutPreference> {
        debug!(
            external_reference = %request.external_reference,
            "creating checkout preference"
        );
        let resp = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::upstream("payment", e.to_string()))?;

        let resp = Self::check(resp, "create preference").await?;
        resp.json()
            .await
            .map_err(|e| DomainError::upstream("payment", format!("decode preference: {}", e)))
    }

    async fn get_payment(&self, id: &str) -> DomainResult<Payment> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DomainError::upstream("payment", e.to_string()))?;

        let resp = Self::check(resp, "payment lookup").await?;
        resp.json()
            .await
            .map_err(|e| DomainError::upstream("payment", format!("decode payment: {}", e)))
    }

    async fn get_merchant_order(&self, id: &str) -> DomainResult<MerchantOrder> {
        let resp = self
            .http
            .get(format!("{}/merchant_orders/{}", self.base_url, id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DomainError::upstream("payment", e.to_string()))?;

        let resp = Self::check(resp, "merchant order lookup").await?;
        resp.json()
            .await
            .map_err(|e| DomainError::upstream("payment", format!("decode merchant order: {}", e)))
    }
}
