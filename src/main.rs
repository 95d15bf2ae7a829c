//! Flats booking service entry point
//!
//! Reads configuration from environment variables, wires the external
//! ports and serves the REST API.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use flats_booking::application::{
    CheckoutService, ConfirmationNotifier, ReservationIntake, ResendService, WebhookReconciler,
};
use flats_booking::config::AppConfig;
use flats_booking::create_api_router;
use flats_booking::infrastructure::calendar::{CalendarGateway, GoogleCalendarGateway};
use flats_booking::infrastructure::email::build_mailer;
use flats_booking::infrastructure::payment::RestPaymentGateway;
use flats_booking::infrastructure::store::{ReservationStore, RestReservationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting Flats Booking Service...");

    // One HTTP client shared by every outbound port.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;

    // ── External ports ─────────────────────────────────────────
    let store: Arc<dyn ReservationStore> =
        Arc::new(RestReservationStore::new(http.clone(), &config.store));
    let payments = Arc::new(RestPaymentGateway::new(http.clone(), &config.payment));

    let mailer = build_mailer(http.clone(), &config.email);
    if mailer.is_none() {
        warn!("No mail provider configured; guest emails are disabled");
    }
    let email_enabled = mailer.is_some();

    let calendar: Option<Arc<dyn CalendarGateway>> = match &config.calendar {
        Some(cal) => Some(Arc::new(GoogleCalendarGateway::new(http.clone(), cal))),
        None => {
            warn!("No calendar credentials configured; calendar holds are disabled");
            None
        }
    };
    let calendar_enabled = calendar.is_some();
    let calendar_ids = config
        .calendar
        .as_ref()
        .map(|c| c.calendar_ids.clone())
        .unwrap_or_default();

    // ── Application services ───────────────────────────────────
    let notifier = Arc::new(ConfirmationNotifier::new(
        mailer,
        config.brand.clone(),
        config.booking.clone(),
    ));
    let intake = Arc::new(ReservationIntake::new(
        store.clone(),
        notifier.clone(),
        config.booking.clone(),
    ));
    let checkout = Arc::new(CheckoutService::new(
        store.clone(),
        payments.clone(),
        config.payment.clone(),
    ));
    let webhook = Arc::new(WebhookReconciler::new(
        store.clone(),
        payments,
        notifier.clone(),
        calendar,
        calendar_ids,
        config.booking.clone(),
    ));
    let resend = Arc::new(ResendService::new(store.clone(), notifier));

    let router = create_api_router(
        intake,
        checkout,
        webhook,
        resend,
        store,
        email_enabled,
        calendar_enabled,
    );

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("REST API listening on http://{}", address);
    info!("Swagger UI available at http://{}/docs", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
