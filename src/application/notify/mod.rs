//! Guest notifications
//!
//! Builds and sends the pending notice and the confirmation email with its
//! calendar-invite attachment. The notifier owns no retry or dedup state;
//! callers decide whether a failure is fatal (resend endpoint) or merely
//! logged (webhook side effect).

pub mod ics;
pub mod templates;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use tracing::info;

use crate::config::{BookingConfig, BrandConfig};
use crate::domain::{DomainError, DomainResult, Reservation};
use crate::infrastructure::email::{EmailAttachment, Mailer, OutgoingEmail};

use ics::{build_ics, IcsInvite};

const ATTACHMENT_FILENAME: &str = "reserva.ics";
const ATTACHMENT_MIME: &str = "text/calendar";

pub struct ConfirmationNotifier {
    mailer: Option<Arc<dyn Mailer>>,
    brand: BrandConfig,
    booking: BookingConfig,
}

impl ConfirmationNotifier {
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        brand: BrandConfig,
        booking: BookingConfig,
    ) -> Self {
        Self {
            mailer,
            brand,
            booking,
        }
    }

    pub fn has_mailer(&self) -> bool {
        self.mailer.is_some()
    }

    fn mailer(&self) -> DomainResult<&Arc<dyn Mailer>> {
        self.mailer
            .as_ref()
            .ok_or_else(|| DomainError::upstream("email", "no mail provider configured"))
    }

    /// The invite for a reservation's stay window.
    fn invite(&self, reservation: &Reservation) -> IcsInvite {
        let (start, end) = reservation.range().window(
            self.booking.checkin_hour,
            self.booking.checkout_hour,
            self.booking.offset(),
        );
        IcsInvite {
            uid: format!("reserva-{}@{}", reservation.id, brand_domain(&self.brand)),
            summary: format!("Estadia — {} ({})", self.brand.name, reservation.flat_slug),
            description: templates::invite_description(reservation, &self.brand),
            location: format!("{} — {}", self.brand.name, self.brand.address),
            start: start.to_utc(),
            end: end.to_utc(),
            stamp: Utc::now(),
        }
    }

    /// Send the plaintext "reservation pending" notice.
    pub async fn send_pending_notice(&self, reservation: &Reservation) -> DomainResult<String> {
        let email = OutgoingEmail {
            to: reservation.hospede_email.clone(),
            subject: format!("Reserva pendente • {}", reservation.flat_nome),
            text: templates::pending_text(reservation, &self.brand, self.booking.hold_minutes),
            html: None,
            attachments: Vec::new(),
        };
        self.mailer()?.send(&email).await
    }

    /// Send the confirmation email with the .ics attachment.
    pub async fn send_confirmation(&self, reservation: &Reservation) -> DomainResult<String> {
        let ics = build_ics(&self.invite(reservation));
        let email = OutgoingEmail {
            to: reservation.hospede_email.clone(),
            subject: format!(
                "Reserva confirmada — {} → {}",
                reservation.checkin, reservation.checkout
            ),
            text: templates::confirmation_text(reservation, &self.brand),
            html: Some(templates::confirmation_html(reservation, &self.brand)),
            attachments: vec![EmailAttachment {
                filename: ATTACHMENT_FILENAME.to_string(),
                content: BASE64.encode(ics.as_bytes()),
                mime_type: ATTACHMENT_MIME.to_string(),
            }],
        };
        let id = self.mailer()?.send(&email).await?;
        info!(
            reservation_id = %reservation.id,
            to = %reservation.hospede_email,
            "confirmation email sent"
        );
        Ok(id)
    }
}

/// Domain-ish suffix for invite UIDs, derived from the brand site.
fn brand_domain(brand: &BrandConfig) -> String {
    brand
        .site
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ReservationStatus;
    use std::sync::Mutex;

    /// Mailer that records messages instead of delivering them.
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub(crate) fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> DomainResult<String> {
            if self.fail {
                return Err(DomainError::upstream("email", "delivery refused"));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok("msg-1".to_string())
        }
    }

    fn notifier(mailer: Arc<dyn Mailer>) -> ConfirmationNotifier {
        ConfirmationNotifier::new(
            Some(mailer),
            BrandConfig::default(),
            BookingConfig::default(),
        )
    }

    #[tokio::test]
    async fn confirmation_email_carries_ics_attachment() {
        let mailer = Arc::new(RecordingMailer::new());
        let n = notifier(mailer.clone());
        let reservation = crate::domain::reservation::sample(ReservationStatus::Confirmed);

        n.send_confirmation(&reservation).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.to, "maria@example.com");
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, "reserva.ics");
        let ics = String::from_utf8(BASE64.decode(&email.attachments[0].content).unwrap()).unwrap();
        assert!(ics.contains("UID:reserva-r-1@sucessoflats.vercel.app"));
        assert!(ics.contains("DTSTART:20250110T170000Z"));
        assert!(email.html.is_some());
    }

    #[tokio::test]
    async fn pending_notice_is_plaintext_only() {
        let mailer = Arc::new(RecordingMailer::new());
        let n = notifier(mailer.clone());
        let reservation = crate::domain::reservation::sample(ReservationStatus::Pending);

        n.send_pending_notice(&reservation).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].html.is_none());
        assert!(sent[0].attachments.is_empty());
        assert!(sent[0].subject.contains("Reserva pendente"));
    }

    #[tokio::test]
    async fn missing_mailer_is_an_upstream_error() {
        let n = ConfirmationNotifier::new(None, BrandConfig::default(), BookingConfig::default());
        let reservation = crate::domain::reservation::sample(ReservationStatus::Confirmed);
        let err = n.send_confirmation(&reservation).await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream { service: "email", .. }));
    }
}
