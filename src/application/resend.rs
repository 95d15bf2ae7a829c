//! Manual confirmation-email resend
//!
//! Operator-facing recovery path for when the webhook-time email was lost.
//! Unlike the webhook side effect, failures here are surfaced to the
//! caller.

use std::sync::Arc;

use tracing::info;

use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::store::ReservationStore;

use super::notify::ConfirmationNotifier;

pub struct ResendService {
    store: Arc<dyn ReservationStore>,
    notifier: Arc<ConfirmationNotifier>,
}

impl ResendService {
    pub fn new(store: Arc<dyn ReservationStore>, notifier: Arc<ConfirmationNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Re-send the confirmation email for an already-confirmed reservation.
    /// Returns the provider's message id.
    pub async fn resend_confirmation(&self, reservation_id: &str) -> DomainResult<String> {
        let reservation = self
            .store
            .get(reservation_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "reservation",
                id: reservation_id.to_string(),
            })?;

        if !reservation.is_confirmed() {
            return Err(DomainError::NotConfirmed(reservation.status.to_string()));
        }
        if reservation.hospede_email.trim().is_empty() {
            return Err(DomainError::MissingGuestEmail(reservation.id.clone()));
        }

        let message_id = self.notifier.send_confirmation(&reservation).await?;
        info!(%reservation_id, %message_id, "confirmation email re-sent");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notify::tests::RecordingMailer;
    use crate::config::{BookingConfig, BrandConfig};
    use crate::domain::reservation::sample;
    use crate::domain::ReservationStatus;
    use crate::infrastructure::email::Mailer;
    use crate::infrastructure::store::InMemoryReservationStore;

    fn service(store: Arc<InMemoryReservationStore>, mailer: Arc<RecordingMailer>) -> ResendService {
        let notifier = Arc::new(ConfirmationNotifier::new(
            Some(mailer as Arc<dyn Mailer>),
            BrandConfig::default(),
            BookingConfig::default(),
        ));
        ResendService::new(store, notifier)
    }

    #[tokio::test]
    async fn resends_for_confirmed_reservation() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Confirmed));
        let mailer = Arc::new(RecordingMailer::new());
        let svc = service(store, mailer.clone());

        let id = svc.resend_confirmation("r-1").await.unwrap();

        assert_eq!(id, "msg-1");
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paid_reservation_also_counts_as_confirmed() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Paid));
        let mailer = Arc::new(RecordingMailer::new());
        let svc = service(store, mailer);

        assert!(svc.resend_confirmation("r-1").await.is_ok());
    }

    #[tokio::test]
    async fn pending_reservation_is_rejected() {
        let store = Arc::new(InMemoryReservationStore::new());
        store.put(sample(ReservationStatus::Pending));
        let mailer = Arc::new(RecordingMailer::new());
        let svc = service(store, mailer.clone());

        let err = svc.resend_confirmation("r-1").await.unwrap_err();

        assert!(matches!(err, DomainError::NotConfirmed(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_reservation_is_not_found() {
        let store = Arc::new(InMemoryReservationStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let svc = service(store, mailer);

        let err = svc.resend_confirmation("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn blank_guest_email_is_rejected() {
        let store = Arc::new(InMemoryReservationStore::new());
        let mut r = sample(ReservationStatus::Confirmed);
        r.hospede_email = " ".to_string();
        store.put(r);
        let mailer = Arc::new(RecordingMailer::new());
        let svc = service(store, mailer);

        let err = svc.resend_confirmation("r-1").await.unwrap_err();
        assert!(matches!(err, DomainError::MissingGuestEmail(_)));
    }
}
