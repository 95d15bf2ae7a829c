//! Payment-session creation
//!
//! Turns a pending reservation into a hosted checkout preference. The
//! reservation id travels as the preference's `external_reference`, which
//! is how the webhook reconciler finds its way back.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::PaymentConfig;
use crate::domain::{DomainError, DomainResult, Reservation};
use crate::infrastructure::payment::{
    BackUrls, PaymentGateway, PaymentMethods, PreferenceItem, PreferencePayer, PreferenceRequest,
};
use crate::infrastructure::store::ReservationStore;

/// Round a charge amount to whole cents, with a floor of one cent. The
/// provider rejects zero and sub-cent unit prices.
pub fn normalize_amount(value: f64) -> f64 {
    let cents = (value * 100.0).round();
    let cents = if cents < 1.0 { 1.0 } else { cents };
    cents / 100.0
}

/// A created checkout session, ready for redirect.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub reservation_id: String,
    pub preference_id: String,
    pub init_point: String,
}

pub struct CheckoutService {
    store: Arc<dyn ReservationStore>,
    gateway: Arc<dyn PaymentGateway>,
    payment: PaymentConfig,
}

impl CheckoutService {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        gateway: Arc<dyn PaymentGateway>,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            payment,
        }
    }

    /// Create a checkout session for an existing reservation.
    pub async fn create_session(&self, reservation_id: &str) -> DomainResult<CheckoutSession> {
        let reservation = self
            .store
            .get(reservation_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "reservation",
                id: reservation_id.to_string(),
            })?;

        let request = self.preference_for(&reservation);
        let preference = self.gateway.create_preference(&request).await?;
        let init_point = preference
            .redirect_url()
            .ok_or_else(|| DomainError::upstream("payment", "preference has no checkout URL"))?
            .to_string();

        info!(
            reservation_id = %reservation.id,
            preference_id = %preference.id,
            "checkout preference created"
        );

        Ok(CheckoutSession {
            reservation_id: reservation.id,
            preference_id: preference.id,
            init_point,
        })
    }

    fn preference_for(&self, reservation: &Reservation) -> PreferenceRequest {
        PreferenceRequest {
            items: vec![PreferenceItem {
                title: format!(
                    "Reserva — {} • {} → {}",
                    reservation.flat_nome, reservation.checkin, reservation.checkout
                ),
                quantity: 1,
                unit_price: normalize_amount(reservation.total),
                currency_id: self.payment.currency.clone(),
            }],
            payer: PreferencePayer {
                name: reservation.hospede_nome.clone(),
                email: reservation.hospede_email.clone(),
            },
            back_urls: BackUrls {
                success: self.payment.success_url(),
                failure: self.payment.failure_url(),
                pending: self.payment.pending_url(),
            },
            auto_return: "approved".to_string(),
            external_reference: reservation.id.clone(),
            payment_methods: PaymentMethods {
                excluded_payment_types: Vec::new(),
                installments: 12,
            },
            metadata: serde_json::json!({
                "reserva_id": reservation.id,
                "flat_id": reservation.flat_id,
                "flat_slug": reservation.flat_slug,
            }),
            notification_url: self.payment.notification_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::sample;
    use crate::domain::ReservationStatus;
    use crate::infrastructure::payment::CheckoutPreference;
    use crate::infrastructure::store::InMemoryReservationStore;
    use std::sync::Mutex;

    struct StubGateway {
        captured: Mutex<Vec<PreferenceRequest>>,
        preference: CheckoutPreference,
    }

    impl StubGateway {
        fn new(preference: CheckoutPreference) -> Self {
            Self {
                captured: Mutex::new(Vec::new()),
                preference,
            }
        }
    }

    #[async_trait::async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_preference(
            &self,
            request: &PreferenceRequest,
        ) -> DomainResult<CheckoutPreference> {
            self.captured.lock().unwrap().push(request.clone());
            Ok(self.preference.clone())
        }

        async fn get_payment(&self, _id: &str) -> DomainResult<crate::infrastructure::payment::Payment> {
            unimplemented!("not used by checkout")
        }

        async fn get_merchant_order(
            &self,
            _id: &str,
        ) -> DomainResult<crate::infrastructure::payment::MerchantOrder> {
            unimplemented!("not used by checkout")
        }
    }

    fn payment_config() -> PaymentConfig {
        PaymentConfig {
            access_token: "t".to_string(),
            base_url: "https://api.mercadopago.com".to_string(),
            app_base_url: "https://flats.example.com".to_string(),
            back_url_success: None,
            back_url_failure: None,
            back_url_pending: None,
            currency: "BRL".to_string(),
        }
    }

    #[test]
    fn normalizes_amounts_to_cents_with_a_floor() {
        assert_eq!(normalize_amount(100.0), 100.0);
        assert_eq!(normalize_amount(99.999), 100.0);
        assert_eq!(normalize_amount(0.004), 0.01);
        assert_eq!(normalize_amount(0.0), 0.01);
    }

    #[tokio::test]
    async fn builds_preference_with_reservation_reference() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Pending));
        let gateway = Arc::new(StubGateway::new(CheckoutPreference {
            id: "pref-1".to_string(),
            init_point: Some("https://pay.example.com/pref-1".to_string()),
            sandbox_init_point: None,
        }));
        let svc = CheckoutService::new(store, gateway.clone(), payment_config());

        let session = svc.create_session("r-1").await.unwrap();

        assert_eq!(session.reservation_id, "r-1");
        assert_eq!(session.preference_id, "pref-1");
        assert_eq!(session.init_point, "https://pay.example.com/pref-1");

        let captured = gateway.captured.lock().unwrap();
        let request = &captured[0];
        assert_eq!(request.external_reference, "r-1");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 1);
        assert_eq!(request.items[0].unit_price, 300.0);
        assert_eq!(request.items[0].currency_id, "BRL");
        assert!(request.items[0].title.contains("2025-01-10 → 2025-01-12"));
        assert_eq!(request.auto_return, "approved");
        assert_eq!(
            request.notification_url,
            "https://flats.example.com/api/v1/payments/webhook"
        );
        assert_eq!(
            request.back_urls.success,
            "https://flats.example.com/pages/sucesso.html"
        );
    }

    #[tokio::test]
    async fn unknown_reservation_is_not_found() {
        let store = Arc::new(InMemoryReservationStore::new());
        let gateway = Arc::new(StubGateway::new(CheckoutPreference {
            id: "pref-1".to_string(),
            init_point: None,
            sandbox_init_point: None,
        }));
        let svc = CheckoutService::new(store, gateway, payment_config());

        let err = svc.create_session("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn preference_without_checkout_url_is_an_upstream_error() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Pending));
        let gateway = Arc::new(StubGateway::new(CheckoutPreference {
            id: "pref-1".to_string(),
            init_point: None,
            sandbox_init_point: None,
        }));
        let svc = CheckoutService::new(store, gateway, payment_config());

        let err = svc.create_session("r-1").await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream { service: "payment", .. }));
    }
}
