//! HTTP API server for the boat rental marketplace.
//!
//! Provides REST endpoints for booking creation, payment lookup and
//! gateway webhooks, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use booking::{
    BookingService, LoggingNotificationSink, NotificationSink, PaymentGateway, PaymentProcessor,
    SandboxGateway, WebhookProcessor,
};
use chrono::{Duration as ChronoDuration, Utc};
use domain::{AvailabilityWindow, Boat, Money, User};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{
    AvailabilityStore, BoatStore, BookingStore, InMemoryAvailabilityStore, InMemoryBoatStore,
    InMemoryBookingStore, InMemoryPaymentStore, InMemoryUserStore, PaymentStore, UserStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::bookings::AppState;

/// Application state backed entirely by in-memory stores.
pub type InMemoryAppState = AppState<
    InMemoryUserStore,
    InMemoryBoatStore,
    InMemoryAvailabilityStore,
    InMemoryBookingStore,
    InMemoryPaymentStore,
    SandboxGateway,
    LoggingNotificationSink,
>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U, Bo, A, B, P, G, N>(
    state: Arc<AppState<U, Bo, A, B, P, G, N>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    U: UserStore + 'static,
    Bo: BoatStore + 'static,
    A: AvailabilityStore + 'static,
    B: BookingStore + Clone + 'static,
    P: PaymentStore + Clone + 'static,
    G: PaymentGateway + 'static,
    N: NotificationSink + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/bookings", post(routes::bookings::create::<U, Bo, A, B, P, G, N>))
        .route("/bookings", get(routes::bookings::list::<U, Bo, A, B, P, G, N>))
        .route("/bookings/{id}", get(routes::bookings::get::<U, Bo, A, B, P, G, N>))
        .route(
            "/bookings/{id}/cancel",
            post(routes::bookings::cancel::<U, Bo, A, B, P, G, N>),
        )
        .route(
            "/payments/transaction/{tx}",
            get(routes::payments::by_transaction::<U, Bo, A, B, P, G, N>),
        )
        .route(
            "/payments/webhook",
            post(routes::payments::webhook::<U, Bo, A, B, P, G, N>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default in-memory application state, seeded with a demo
/// owner, renter, boat and a 90-day availability window so the API is
/// usable out of the box. The seeded ids are logged at startup.
pub async fn create_default_state(config: &Config) -> Arc<InMemoryAppState> {
    let users = InMemoryUserStore::new();
    let boats = InMemoryBoatStore::new();
    let availability = InMemoryAvailabilityStore::new();
    let bookings = InMemoryBookingStore::new();
    let payments = InMemoryPaymentStore::new();

    let owner = User::new(common::UserId::new(), "owner@example.com", "Demo Owner");
    let renter = User::new(common::UserId::new(), "renter@example.com", "Demo Renter");
    let boat = Boat::new(common::BoatId::new(), owner.id, "Demo Catamaran");

    let window_start = Utc::now();
    let window = AvailabilityWindow::new(
        boat.id,
        window_start,
        window_start + ChronoDuration::days(90),
        Money::from_cents(25_000),
    )
    .expect("demo availability window is valid");

    users.add(&owner).await.expect("seed owner");
    users.add(&renter).await.expect("seed renter");
    boats.add(&boat).await.expect("seed boat");
    availability.add_window(&window).await.expect("seed window");

    tracing::info!(
        owner = %owner.id,
        renter = %renter.id,
        boat = %boat.id,
        "seeded demo data"
    );

    let gateway = SandboxGateway::new().with_delay(Duration::from_millis(config.gateway_delay_ms));
    let processor = PaymentProcessor::new(payments.clone(), gateway)
        .with_max_amount(Money::from_cents(config.max_payment_amount_cents));

    let service = BookingService::new(
        users,
        boats,
        availability,
        bookings.clone(),
        payments.clone(),
        processor,
        LoggingNotificationSink::new(),
    );

    let webhooks = WebhookProcessor::new(payments, bookings, config.webhook_secret.clone());

    Arc::new(AppState {
        bookings: service,
        webhooks,
    })
}
