//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CheckoutService, ReservationIntake, ResendService, WebhookReconciler};
use crate::infrastructure::store::ReservationStore;

use super::common::ApiResponse;
use super::modules::{health, notifications, payments, reservations};

/// Unified state for all booking routes. Axum extracts each handler's
/// specific state via `FromRef`.
#[derive(Clone)]
pub struct BookingUnifiedState {
    pub intake: Arc<ReservationIntake>,
    pub checkout: Arc<CheckoutService>,
    pub webhook: Arc<WebhookReconciler>,
    pub resend: Arc<ResendService>,
    pub store: Arc<dyn ReservationStore>,
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<BookingUnifiedState> for reservations::ReservationAppState {
    fn from_ref(s: &BookingUnifiedState) -> Self {
        reservations::ReservationAppState {
            intake: Arc::clone(&s.intake),
            store: Arc::clone(&s.store),
        }
    }
}

impl FromRef<BookingUnifiedState> for payments::PaymentAppState {
    fn from_ref(s: &BookingUnifiedState) -> Self {
        payments::PaymentAppState {
            checkout: Arc::clone(&s.checkout),
            webhook: Arc::clone(&s.webhook),
        }
    }
}

impl FromRef<BookingUnifiedState> for notifications::NotificationAppState {
    fn from_ref(s: &BookingUnifiedState) -> Self {
        notifications::NotificationAppState {
            resend: Arc::clone(&s.resend),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Reservations
        reservations::handlers::create_reservation,
        reservations::handlers::get_reservation,
        // Payments
        payments::handlers::create_checkout,
        payments::handlers::payment_webhook,
        // Notifications
        notifications::handlers::resend_confirmation,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Health
            health::HealthResponse,
            // Reservations
            reservations::GuestDto,
            reservations::CreateReservationRequest,
            reservations::CreateReservationResponse,
            reservations::ReservationDto,
            // Payments
            payments::CreateCheckoutRequest,
            payments::CheckoutSessionDto,
            payments::WebhookAckDto,
            // Notifications
            notifications::ResendResponse,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Reservations", description = "Booking intake with date-overlap checking"),
        (name = "Payments", description = "Hosted checkout sessions and payment webhooks"),
        (name = "Notifications", description = "Guest notification management"),
    ),
    info(
        title = "Flats Booking API",
        version = "1.0.0",
        description = "REST API for vacation flat reservations, payments and guest notifications",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    intake: Arc<ReservationIntake>,
    checkout: Arc<CheckoutService>,
    webhook: Arc<WebhookReconciler>,
    resend: Arc<ResendService>,
    store: Arc<dyn ReservationStore>,
    email_enabled: bool,
    calendar_enabled: bool,
) -> Router {
    let unified = BookingUnifiedState {
        intake,
        checkout,
        webhook,
        resend,
        store,
    };

    let health_state = health::HealthState {
        started_at: Arc::new(Instant::now()),
        email_enabled,
        calendar_enabled,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let reservation_routes = Router::new()
        .route("/", post(reservations::create_reservation))
        .route("/{reservation_id}", get(reservations::get_reservation))
        .with_state(unified.clone());

    let payment_routes = Router::new()
        .route("/checkout", post(payments::create_checkout))
        .route("/webhook", post(payments::payment_webhook))
        .with_state(unified.clone());

    let notification_routes = Router::new()
        .route(
            "/{reservation_id}/resend",
            post(notifications::resend_confirmation),
        )
        .with_state(unified);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::health_check).with_state(health_state))
        // Reservations
        .nest("/api/v1/reservations", reservation_routes)
        // Payments
        .nest("/api/v1/payments", payment_routes)
        // Notifications
        .nest("/api/v1/notifications", notification_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
