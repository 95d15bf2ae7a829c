//! Payment provider port
//!
//! Wire types follow the provider's checkout-preference and payment
//! resources; only the fields this service reads are modeled.

mod rest;

pub use rest::RestPaymentGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;

/// One line item of a checkout preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferencePayer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethods {
    pub excluded_payment_types: Vec<String>,
    pub installments: u32,
}

/// Checkout preference submitted to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub payer: PreferencePayer,
    pub back_urls: BackUrls,
    pub auto_return: String,
    /// Carries the reservation id through the payment lifecycle
    pub external_reference: String,
    pub payment_methods: PaymentMethods,
    pub metadata: serde_json::Value,
    pub notification_url: String,
}

/// Created preference, as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPreference {
    pub id: String,
    #[serde(default)]
    pub init_point: Option<String>,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

impl CheckoutPreference {
    /// Hosted checkout URL, preferring the live one.
    pub fn redirect_url(&self) -> Option<&str> {
        self.init_point
            .as_deref()
            .or(self.sandbox_init_point.as_deref())
    }
}

/// Reference to a payment's parent order.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrderRef {
    #[serde(default)]
    pub external_reference: Option<String>,
}

/// A single payment, looked up by the webhook reconciler.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub status: String,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub order: Option<PaymentOrderRef>,
}

/// One payment inside a merchant order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayment {
    pub status: String,
    #[serde(default)]
    pub transaction_amount: f64,
}

/// A merchant (batch) order.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantOrder {
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub payments: Vec<OrderPayment>,
}

impl MerchantOrder {
    /// Approved iff the approved transaction amounts cover the order total.
    pub fn is_fully_paid(&self) -> bool {
        let paid: f64 = self
            .payments
            .iter()
            .filter(|p| p.status == "approved")
            .map(|p| p.transaction_amount)
            .sum();
        paid >= self.total_amount
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout preference.
    async fn create_preference(&self, request: &PreferenceRequest)
        -> DomainResult<CheckoutPreference>;

    /// Look up a single payment by provider id.
    async fn get_payment(&self, id: &str) -> DomainResult<Payment>;

    /// Look up a merchant order by provider id.
    async fn get_merchant_order(&self, id: &str) -> DomainResult<MerchantOrder>;
}
