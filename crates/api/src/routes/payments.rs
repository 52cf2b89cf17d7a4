//! Payment lookup and gateway webhook endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use booking::{NotificationSink, PaymentGateway};
use domain::Payment;
use serde::Serialize;
use store::{AvailabilityStore, BoatStore, BookingStore, PaymentStore, UserStore};

use crate::error::ApiError;
use crate::routes::bookings::AppState;

/// Header carrying the gateway's HMAC signature over the raw body.
pub const SIGNATURE_HEADER: &str = "x-signature";

// -- Response types --

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub booking_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub gateway_message: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

impl PaymentResponse {
    fn from_payment(payment: &Payment) -> Self {
        Self {
            id: payment.id().to_string(),
            booking_id: payment.booking().to_string(),
            amount_cents: payment.amount().cents(),
            method: payment.method().to_string(),
            status: payment.status().to_string(),
            transaction_id: payment.transaction_id().map(String::from),
            gateway_message: payment.gateway_message().map(String::from),
            processed_at: payment.processed_at().map(|at| at.to_rfc3339()),
            created_at: payment.created_at().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    pub updated: bool,
}

// -- Handlers --

/// GET /payments/transaction/{tx} — look up a payment by gateway transaction.
#[tracing::instrument(skip(state))]
pub async fn by_transaction<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    Path(tx): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let payment = state.bookings.payment_by_transaction(&tx).await?;
    Ok(Json(PaymentResponse::from_payment(&payment)))
}

/// POST /payments/webhook — gateway status notification.
///
/// The signature is verified over the raw body bytes, so the body must
/// not be deserialized before verification.
#[tracing::instrument(skip(state, headers, body))]
pub async fn webhook<U, Bo, A, B, P, G, N>(
    State(state): State<Arc<AppState<U, Bo, A, B, P, G, N>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError>
where
    U: UserStore,
    Bo: BoatStore,
    A: AvailabilityStore,
    B: BookingStore + Clone,
    P: PaymentStore + Clone,
    G: PaymentGateway,
    N: NotificationSink,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing X-Signature header".to_string()))?;

    let ack = state.webhooks.handle(&body, signature).await?;

    Ok(Json(WebhookResponse {
        received: true,
        updated: ack.updated,
    }))
}
