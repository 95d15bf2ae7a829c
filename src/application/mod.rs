//! Application services: the booking flows, composed from the domain
//! model and the infrastructure ports.

pub mod checkout;
pub mod intake;
pub mod notify;
pub mod overlap;
pub mod resend;
pub mod webhook;

pub use checkout::{CheckoutService, CheckoutSession};
pub use intake::{EmailStatus, IntakeOutcome, IntakeRequest, ReservationIntake};
pub use notify::ConfirmationNotifier;
pub use overlap::OverlapChecker;
pub use resend::ResendService;
pub use webhook::{WebhookAck, WebhookReconciler};
