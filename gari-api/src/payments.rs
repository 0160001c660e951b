use axum::{
    extract::{Extension, Path, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use gari_core::payment::{PaymentIntent, PaymentMethod, PaymentStatus};
use gari_order::models::{Booking, BookingStatus};
use gari_order::PaymentError;
use gari_shared::models::events::BookingConfirmedEvent;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::bookings::fetch_owned_booking;
use crate::error::AppError;
use crate::middleware::auth::RenterClaims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub intent_id: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct PayBookingRequest {
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub renter_id: String,
    pub balance: f64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{id}/payment-intent", post(initialize_payment_intent))
        .route("/v1/bookings/{id}/pay", post(pay_booking))
        .route("/v1/wallet", axum::routing::get(wallet_balance))
        .layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::auth::renter_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/:id/payment-intent
/// Initialize a payment intent for the amount due now
async fn initialize_payment_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;

    let intent = state
        .payments
        .initialize_payment(booking_id, amount_due_now(&booking), "KES")
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialize payment: {:?}", e);
            AppError::UpstreamError("Payment provider unavailable".to_string())
        })?;

    Ok(Json(PaymentIntentResponse {
        intent_id: intent.id,
        amount: intent.amount,
        currency: intent.currency,
    }))
}

/// POST /v1/bookings/:id/pay
/// Charge the amount due now. Pay-on-site bookings charge only the booking
/// fee; the balance changes hands at pickup.
async fn pay_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<PayBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    // 1. Fetch and verify
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::ConflictError(format!(
            "Booking is already {}",
            booking.status.as_str()
        )));
    }

    // 2. Charge via the orchestrator
    let intent = PaymentIntent {
        id: format!("pi_{}", booking_id.simple()),
        booking_id,
        amount: amount_due_now(&booking),
        currency: "KES".to_string(),
        status: PaymentStatus::RequiresPaymentMethod,
        reference: req.payment_reference.clone(),
        created_at: Utc::now(),
    };

    let status = state
        .payments
        .charge(&claims.sub, req.payment_method, &intent)
        .await
        .map_err(|e| match e {
            PaymentError::InsufficientFunds { .. } => AppError::PaymentRequired(e.to_string()),
            PaymentError::Gateway(msg) => {
                AppError::UpstreamError(format!("Payment failed, try again: {}", msg))
            }
        })?;

    if status != PaymentStatus::Succeeded {
        return Err(AppError::UpstreamError("Payment did not complete".to_string()));
    }

    // 3. Pending → Active
    let updated = state
        .booking_repo
        .update_status(booking_id, BookingStatus::Active)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    // 4. Publish
    let event = BookingConfirmedEvent {
        booking_id,
        car_id: booking.car_id,
        renter_id: claims.sub.clone(),
        total_price: booking.total_price,
        pay_on_site: booking.pay_on_site,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish("booking.confirmed", &booking_id.to_string(), &payload)
            .await;
    }

    info!("Booking confirmed: {} via {:?}", booking_id, req.payment_method);
    Ok(Json(updated))
}

/// GET /v1/wallet
/// The renter's wallet balance
async fn wallet_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
) -> Result<Json<WalletResponse>, AppError> {
    let balance = state.payments.wallet_balance(&claims.sub).await;
    Ok(Json(WalletResponse {
        renter_id: claims.sub,
        balance,
    }))
}

/// The amount collected at booking time: the full total, or just the
/// commission for pay-on-site rentals.
fn amount_due_now(booking: &Booking) -> f64 {
    if booking.pay_on_site {
        booking.booking_fee
    } else {
        booking.total_price
    }
}
