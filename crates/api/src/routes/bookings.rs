//! Booking creation, lookup and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use booking::{
    BookingService, CreateBooking, NotificationSink, PaymentGateway, WebhookProcessor,
};
use common::{BoatId, BookingId, UserId};
use domain::{Booking, CardData, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, UserStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<U, Bo, A, B, P, G, N>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    pub bookings: BookingService<U, Bo, A, B, P, G, N>,
    pub webhooks: WebhookProcessor<P, B>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub renter_id: String,
    pub boat_id: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub payment_method: String,
    pub card: Option<CardRequest>,
    pub installments: Option<u32>,
}

#[derive(Deserialize)]
pub struct CardRequest {
    pub number: String,
    pub holder_name: String,
    pub expiration: String,
    pub cvv: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub renter_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub boat_id: String,
    pub renter_id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub total_price_cents: i64,
}

impl BookingResponse {
    fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id().to_string(),
            boat_id: booking.boat().to_string(),
            renter_id: booking.renter().to_string(),
            start_time: booking.start_time().to_rfc3339(),
            end_time: booking.end_time().to_rfc3339(),
            status: booking.status().to_string(),
            total_price_cents: booking.total_price().cents(),
        }
    }
}

// -- Handlers --

/// POST /bookings — run the booking saga: validate, charge, persist.
#[tracing::instrument(skip(state, req))]
pub async fn create<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(axum::http::StatusCode, Json<BookingResponse>), ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let renter = parse_id(&req.renter_id, "renter_id").map(UserId::from_uuid)?;
    let boat = parse_id(&req.boat_id, "boat_id").map(BoatId::from_uuid)?;
    let method: PaymentMethod = req
        .payment_method
        .parse()
        .map_err(|e: String| ApiError::BadRequest(format!("Invalid payment_method: {e}")))?;

    let card = req
        .card
        .map(|c| CardData::new(c.number, c.holder_name, c.expiration, c.cvv));

    let command = CreateBooking {
        renter,
        boat,
        start_time: req.start_time,
        end_time: req.end_time,
        method,
        card,
        installments: req.installments.unwrap_or(1),
    };

    let booking = state.bookings.create_booking(command).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(BookingResponse::from_booking(&booking)),
    ))
}

/// GET /bookings/{id} — load a booking by ID.
#[tracing::instrument(skip(state))]
pub async fn get<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let booking_id = parse_id(&id, "booking id").map(BookingId::from_uuid)?;
    let booking = state.bookings.get_booking(booking_id).await?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

/// GET /bookings?renter_id={id} — list a renter's bookings, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let renter = parse_id(&query.renter_id, "renter_id").map(UserId::from_uuid)?;
    let bookings = state.bookings.bookings_for_renter(renter).await?;
    let responses = bookings.iter().map(BookingResponse::from_booking).collect();
    Ok(Json(responses))
}

/// POST /bookings/{id}/cancel — cancel a booking, freeing its period.
#[tracing::instrument(skip(state))]
pub async fn cancel<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let booking_id = parse_id(&id, "booking id").map(BookingId::from_uuid)?;
    let booking = state.bookings.cancel_booking(booking_id).await?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

fn parse_id(id: &str, field: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}
