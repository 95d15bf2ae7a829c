//! Payment webhook reconciliation
//!
//! Providers retry webhooks aggressively and send several envelope shapes
//! for the same event, so this flow is tolerant end to end: every outcome
//! maps to an acknowledgement, unprocessable events are acknowledged with
//! a `skipped` marker, and confirmation side effects (email, calendar
//! hold) are fault-isolated from the acknowledgement.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::BookingConfig;
use crate::domain::{Reservation, ReservationStatus};
use crate::infrastructure::calendar::{CalendarGateway, CalendarHold};
use crate::infrastructure::store::ReservationStore;
use crate::infrastructure::payment::PaymentGateway;

use super::notify::{templates, ConfirmationNotifier};

/// Provider notification kinds this service reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Payment,
    MerchantOrder,
}

/// Extract the notification kind and resource id from a webhook body.
///
/// The kind arrives under `type`, `topic` or `action` (with a possible
/// `.updated` suffix); the resource id under `data.id`, `resource` or
/// `id`, as a number, a bare id, or a resource URL.
pub fn classify(body: &Value) -> Option<(NotificationKind, String)> {
    let raw_kind = body
        .get("type")
        .or_else(|| body.get("topic"))
        .or_else(|| body.get("action"))
        .and_then(Value::as_str)?;
    let kind = match raw_kind.split('.').next().unwrap_or_default() {
        "payment" => NotificationKind::Payment,
        "merchant_order" => NotificationKind::MerchantOrder,
        _ => return None,
    };

    let raw_id = body
        .get("data")
        .and_then(|d| d.get("id"))
        .or_else(|| body.get("resource"))
        .or_else(|| body.get("id"))?;
    let id = match raw_id {
        Value::String(s) => s.rsplit('/').next().unwrap_or(s).to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }

    Some((kind, id))
}

/// Acknowledgement returned for every webhook delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<&'static str>,
    #[serde(rename = "reservaId", skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

impl WebhookAck {
    fn skipped(marker: &'static str) -> Self {
        Self {
            ok: true,
            skipped: Some(marker),
            reservation_id: None,
            status: None,
        }
    }

    fn failed() -> Self {
        Self {
            ok: false,
            skipped: None,
            reservation_id: None,
            status: None,
        }
    }

    fn confirmed(reservation_id: String) -> Self {
        Self {
            ok: true,
            skipped: None,
            reservation_id: Some(reservation_id),
            status: Some(ReservationStatus::Confirmed.as_str()),
        }
    }
}

pub struct WebhookReconciler {
    store: Arc<dyn ReservationStore>,
    payments: Arc<dyn PaymentGateway>,
    notifier: Arc<ConfirmationNotifier>,
    calendar: Option<Arc<dyn CalendarGateway>>,
    /// Flat slug → calendar id
    calendar_ids: HashMap<String, String>,
    booking: BookingConfig,
}

impl WebhookReconciler {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        payments: Arc<dyn PaymentGateway>,
        notifier: Arc<ConfirmationNotifier>,
        calendar: Option<Arc<dyn CalendarGateway>>,
        calendar_ids: HashMap<String, String>,
        booking: BookingConfig,
    ) -> Self {
        Self {
            store,
            payments,
            notifier,
            calendar,
            calendar_ids,
            booking,
        }
    }

    /// Reconcile one webhook delivery. Never fails: every path collapses
    /// into an acknowledgement the handler returns with HTTP 200.
    pub async fn process(&self, body: Value) -> WebhookAck {
        let Some((kind, resource_id)) = classify(&body) else {
            return WebhookAck::skipped("unknown_type");
        };

        let reservation_id = match self.resolve_reservation_id(kind, &resource_id).await {
            Ok(Some(id)) => id,
            Ok(None) => return WebhookAck::skipped("not_approved"),
            Err(marker) => return WebhookAck::skipped(marker),
        };

        let reservation = match self.store.get(&reservation_id).await {
            Ok(Some(r)) => r,
            Ok(None) => {
                warn!(%reservation_id, "webhook for unknown reservation");
                return WebhookAck::skipped("reservation_not_found");
            }
            Err(e) => {
                warn!(%reservation_id, error = %e, "reservation lookup failed");
                return WebhookAck::failed();
            }
        };

        if reservation.is_confirmed() {
            info!(%reservation_id, "reservation already confirmed");
            return WebhookAck::confirmed(reservation_id);
        }

        if let Err(e) = self
            .store
            .set_status(&reservation_id, ReservationStatus::Confirmed)
            .await
        {
            warn!(%reservation_id, error = %e, "status update failed");
            return WebhookAck::failed();
        }
        info!(%reservation_id, "reservation confirmed");

        self.run_side_effects(&reservation).await;
        WebhookAck::confirmed(reservation_id)
    }

    /// Fetch the provider resource and decide whether it confirms a
    /// reservation. `Ok(None)` means the event is real but not (yet) an
    /// approval; `Err` carries a skip marker.
    async fn resolve_reservation_id(
        &self,
        kind: NotificationKind,
        resource_id: &str,
    ) -> Result<Option<String>, &'static str> {
        match kind {
            NotificationKind::Payment => {
                let payment = match self.payments.get_payment(resource_id).await {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(%resource_id, error = %e, "payment lookup failed");
                        return Err("lookup_not_found");
                    }
                };
                if payment.status != "approved" {
                    return Ok(None);
                }
                payment
                    .external_reference
                    .or(payment.order.and_then(|o| o.external_reference))
                    .map(Some)
                    .ok_or("missing_external_reference")
            }
            NotificationKind::MerchantOrder => {
                let order = match self.payments.get_merchant_order(resource_id).await {
                    Ok(o) => o,
                    Err(e) => {
                        warn!(%resource_id, error = %e, "merchant order lookup failed");
                        return Err("lookup_not_found");
                    }
                };
                if !order.is_fully_paid() {
                    return Ok(None);
                }
                order
                    .external_reference
                    .map(Some)
                    .ok_or("missing_external_reference")
            }
        }
    }

    /// Confirmation side effects. Failures are logged, never propagated.
    async fn run_side_effects(&self, reservation: &Reservation) {
        if self.notifier.has_mailer() {
            if reservation.hospede_email.trim().is_empty() {
                warn!(reservation_id = %reservation.id, "no guest email on file");
            } else if let Err(e) = self.notifier.send_confirmation(reservation).await {
                warn!(
                    reservation_id = %reservation.id,
                    error = %e,
                    "confirmation email failed"
                );
            }
        }

        if let Some(calendar) = &self.calendar {
            match self.calendar_ids.get(&reservation.flat_slug) {
                Some(calendar_id) => {
                    let hold = self.hold_for(reservation, calendar_id);
                    match calendar.create_hold(&hold).await {
                        Ok(event) => info!(
                            reservation_id = %reservation.id,
                            event_id = %event.id,
                            "calendar hold in place"
                        ),
                        Err(e) => warn!(
                            reservation_id = %reservation.id,
                            error = %e,
                            "calendar hold failed"
                        ),
                    }
                }
                None => warn!(
                    reservation_id = %reservation.id,
                    flat_slug = %reservation.flat_slug,
                    "no calendar mapped for flat"
                ),
            }
        }
    }

    fn hold_for(&self, reservation: &Reservation, calendar_id: &str) -> CalendarHold {
        let (start, end) = reservation.range().window(
            self.booking.checkin_hour,
            self.booking.checkout_hour,
            self.booking.offset(),
        );
        CalendarHold {
            calendar_id: calendar_id.to_string(),
            reservation_id: reservation.id.clone(),
            summary: templates::hold_summary(reservation),
            description: templates::hold_description(reservation),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notify::tests::RecordingMailer;
    use crate::config::BrandConfig;
    use crate::domain::reservation::sample;
    use crate::domain::{DomainError, DomainResult};
    use crate::infrastructure::calendar::CalendarEvent;
    use crate::infrastructure::email::Mailer;
    use crate::infrastructure::payment::{
        CheckoutPreference, MerchantOrder, OrderPayment, Payment, PaymentOrderRef,
        PreferenceRequest,
    };
    use crate::infrastructure::store::InMemoryReservationStore;
    use serde_json::json;
    use std::sync::Mutex;

    // ── Stubs ──────────────────────────────────────────────────────────

    struct StubPayments {
        payment: Option<Payment>,
        order: Option<MerchantOrder>,
    }

    #[async_trait::async_trait]
    impl PaymentGateway for StubPayments {
        async fn create_preference(
            &self,
            _request: &PreferenceRequest,
        ) -> DomainResult<CheckoutPreference> {
            unimplemented!("not used by webhook")
        }

        async fn get_payment(&self, _id: &str) -> DomainResult<Payment> {
            self.payment
                .clone()
                .ok_or_else(|| DomainError::upstream("payment", "not found"))
        }

        async fn get_merchant_order(&self, _id: &str) -> DomainResult<MerchantOrder> {
            self.order
                .clone()
                .ok_or_else(|| DomainError::upstream("payment", "not found"))
        }
    }

    #[derive(Default)]
    struct RecordingCalendar {
        existing: Option<CalendarEvent>,
        created: Mutex<Vec<CalendarHold>>,
    }

    #[async_trait::async_trait]
    impl CalendarGateway for RecordingCalendar {
        async fn find_hold(&self, _hold: &CalendarHold) -> DomainResult<Option<CalendarEvent>> {
            Ok(self.existing.clone())
        }

        async fn create_hold(&self, hold: &CalendarHold) -> DomainResult<CalendarEvent> {
            if let Some(existing) = &self.existing {
                return Ok(existing.clone());
            }
            self.created.lock().unwrap().push(hold.clone());
            Ok(CalendarEvent {
                id: "evt-1".to_string(),
                summary: Some(hold.summary.clone()),
            })
        }
    }

    fn approved_payment(reference: Option<&str>) -> Payment {
        Payment {
            status: "approved".to_string(),
            external_reference: reference.map(str::to_string),
            order: None,
        }
    }

    struct Fixture {
        store: Arc<InMemoryReservationStore>,
        mailer: Arc<RecordingMailer>,
        calendar: Arc<RecordingCalendar>,
        reconciler: WebhookReconciler,
    }

    fn fixture(payments: StubPayments) -> Fixture {
        let store = Arc::new(InMemoryReservationStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let calendar = Arc::new(RecordingCalendar::default());
        let notifier = Arc::new(ConfirmationNotifier::new(
            Some(mailer.clone() as Arc<dyn Mailer>),
            BrandConfig::default(),
            BookingConfig::default(),
        ));
        let mut calendar_ids = HashMap::new();
        calendar_ids.insert("flat-1".to_string(), "cal_abc".to_string());
        let reconciler = WebhookReconciler::new(
            store.clone(),
            Arc::new(payments),
            notifier,
            Some(calendar.clone() as Arc<dyn CalendarGateway>),
            calendar_ids,
            BookingConfig::default(),
        );
        Fixture {
            store,
            mailer,
            calendar,
            reconciler,
        }
    }

    // ── classify ───────────────────────────────────────────────────────

    #[test]
    fn classifies_payment_with_numeric_data_id() {
        let body = json!({"type": "payment", "data": {"id": 12345}});
        assert_eq!(
            classify(&body),
            Some((NotificationKind::Payment, "12345".to_string()))
        );
    }

    #[test]
    fn classifies_action_with_suffix() {
        let body = json!({"action": "payment.updated", "data": {"id": "987"}});
        assert_eq!(
            classify(&body),
            Some((NotificationKind::Payment, "987".to_string()))
        );
    }

    #[test]
    fn classifies_merchant_order_resource_url() {
        let body = json!({
            "topic": "merchant_order",
            "resource": "https://api.example.com/merchant_orders/555"
        });
        assert_eq!(
            classify(&body),
            Some((NotificationKind::MerchantOrder, "555".to_string()))
        );
    }

    #[test]
    fn unknown_topic_is_not_classified() {
        assert!(classify(&json!({"topic": "chargebacks", "id": 1})).is_none());
        assert!(classify(&json!({"data": {"id": 1}})).is_none());
        assert!(classify(&json!({"type": "payment"})).is_none());
    }

    // ── process ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn approved_payment_confirms_and_fires_side_effects() {
        let fx = fixture(StubPayments {
            payment: Some(approved_payment(Some("r-1"))),
            order: None,
        });
        fx.store.put(sample(ReservationStatus::Pending));

        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;

        assert!(ack.ok);
        assert_eq!(ack.reservation_id.as_deref(), Some("r-1"));
        assert_eq!(ack.status, Some("confirmada"));
        let stored = fx.store.get("r-1").await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
        assert_eq!(fx.mailer.sent.lock().unwrap().len(), 1);
        let holds = fx.calendar.created.lock().unwrap();
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].calendar_id, "cal_abc");
        assert_eq!(holds[0].reservation_id, "r-1");
        assert_eq!(holds[0].start.to_rfc3339(), "2025-01-10T14:00:00-03:00");
        assert_eq!(holds[0].end.to_rfc3339(), "2025-01-12T12:00:00-03:00");
    }

    #[tokio::test]
    async fn repeated_delivery_is_idempotent() {
        let fx = fixture(StubPayments {
            payment: Some(approved_payment(Some("r-1"))),
            order: None,
        });
        fx.store.put(sample(ReservationStatus::Confirmed));

        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;

        assert!(ack.ok);
        assert_eq!(ack.status, Some("confirmada"));
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
        assert!(fx.calendar.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_approved_payment_is_skipped() {
        let fx = fixture(StubPayments {
            payment: Some(Payment {
                status: "pending".to_string(),
                external_reference: Some("r-1".to_string()),
                order: None,
            }),
            order: None,
        });
        fx.store.put(sample(ReservationStatus::Pending));

        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;

        assert!(ack.ok);
        assert_eq!(ack.skipped, Some("not_approved"));
        let stored = fx.store.get("r-1").await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_kind_is_skipped() {
        let fx = fixture(StubPayments {
            payment: None,
            order: None,
        });
        let ack = fx.reconciler.process(json!({"topic": "plan", "id": 9})).await;
        assert!(ack.ok);
        assert_eq!(ack.skipped, Some("unknown_type"));
    }

    #[tokio::test]
    async fn failed_lookup_is_acknowledged_as_skipped() {
        let fx = fixture(StubPayments {
            payment: None,
            order: None,
        });
        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;
        assert!(ack.ok);
        assert_eq!(ack.skipped, Some("lookup_not_found"));
    }

    #[tokio::test]
    async fn missing_external_reference_is_skipped() {
        let fx = fixture(StubPayments {
            payment: Some(approved_payment(None)),
            order: None,
        });
        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;
        assert!(ack.ok);
        assert_eq!(ack.skipped, Some("missing_external_reference"));
    }

    #[tokio::test]
    async fn reference_falls_back_to_payment_order() {
        let fx = fixture(StubPayments {
            payment: Some(Payment {
                status: "approved".to_string(),
                external_reference: None,
                order: Some(PaymentOrderRef {
                    external_reference: Some("r-1".to_string()),
                }),
            }),
            order: None,
        });
        fx.store.put(sample(ReservationStatus::Pending));

        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;
        assert_eq!(ack.reservation_id.as_deref(), Some("r-1"));
    }

    #[tokio::test]
    async fn unknown_reservation_is_skipped() {
        let fx = fixture(StubPayments {
            payment: Some(approved_payment(Some("ghost"))),
            order: None,
        });
        let ack = fx
            .reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;
        assert!(ack.ok);
        assert_eq!(ack.skipped, Some("reservation_not_found"));
    }

    #[tokio::test]
    async fn fully_paid_merchant_order_confirms() {
        let fx = fixture(StubPayments {
            payment: None,
            order: Some(MerchantOrder {
                external_reference: Some("r-1".to_string()),
                total_amount: 300.0,
                payments: vec![OrderPayment {
                    status: "approved".to_string(),
                    transaction_amount: 300.0,
                }],
            }),
        });
        fx.store.put(sample(ReservationStatus::Pending));

        let ack = fx
            .reconciler
            .process(json!({
                "topic": "merchant_order",
                "resource": "https://api.example.com/merchant_orders/555"
            }))
            .await;

        assert!(ack.ok);
        assert_eq!(ack.status, Some("confirmada"));
    }

    #[tokio::test]
    async fn partially_paid_merchant_order_is_skipped() {
        let fx = fixture(StubPayments {
            payment: None,
            order: Some(MerchantOrder {
                external_reference: Some("r-1".to_string()),
                total_amount: 300.0,
                payments: vec![OrderPayment {
                    status: "approved".to_string(),
                    transaction_amount: 150.0,
                }],
            }),
        });
        fx.store.put(sample(ReservationStatus::Pending));

        let ack = fx
            .reconciler
            .process(json!({"topic": "merchant_order", "resource": "555"}))
            .await;
        assert_eq!(ack.skipped, Some("not_approved"));
    }

    #[tokio::test]
    async fn email_failure_does_not_break_the_ack() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Pending));
        let notifier = Arc::new(ConfirmationNotifier::new(
            Some(Arc::new(RecordingMailer::failing()) as Arc<dyn Mailer>),
            BrandConfig::default(),
            BookingConfig::default(),
        ));
        let reconciler = WebhookReconciler::new(
            store.clone(),
            Arc::new(StubPayments {
                payment: Some(approved_payment(Some("r-1"))),
                order: None,
            }),
            notifier,
            None,
            HashMap::new(),
            BookingConfig::default(),
        );

        let ack = reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;

        assert!(ack.ok);
        let stored = store.get("r-1").await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn existing_calendar_hold_is_not_duplicated() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Pending));
        let calendar = Arc::new(RecordingCalendar {
            existing: Some(CalendarEvent {
                id: "evt-old".to_string(),
                summary: None,
            }),
            created: Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(ConfirmationNotifier::new(
            None,
            BrandConfig::default(),
            BookingConfig::default(),
        ));
        let mut calendar_ids = HashMap::new();
        calendar_ids.insert("flat-1".to_string(), "cal_abc".to_string());
        let reconciler = WebhookReconciler::new(
            store,
            Arc::new(StubPayments {
                payment: Some(approved_payment(Some("r-1"))),
                order: None,
            }),
            notifier,
            Some(calendar.clone() as Arc<dyn CalendarGateway>),
            calendar_ids,
            BookingConfig::default(),
        );

        let ack = reconciler
            .process(json!({"type": "payment", "data": {"id": 1}}))
            .await;

        assert!(ack.ok);
        assert!(calendar.created.lock().unwrap().is_empty());
    }
}
