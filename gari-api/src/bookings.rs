use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use gari_catalog::availability::{AvailabilityCalendar, DateRange};
use gari_order::models::{Booking, BookingDraft, BookingStatus};
use gari_quote::{QuoteCalculator, RefundQuote};
use gari_shared::models::events::BookingCancelledEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::RenterClaims;
use crate::quotes::rule_error;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub with_insurance: bool,
    #[serde(default)]
    pub cross_country: bool,
    #[serde(default)]
    pub pay_on_site: bool,
    pub payment_method: gari_core::payment::PaymentMethod,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    pub booking_id: Uuid,
    pub status: String,
    pub refund: RefundQuote,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::auth::renter_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Create a Pending booking after re-validating gating rules and
/// calendar availability.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    // 1. Resolve the car
    let car = state
        .car_repo
        .get_car(req.car_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Car not found: {}", req.car_id)))?;

    // 2. Gating rules (length, age), re-checked in case quoting was
    // skipped. The stored driver profile backs up a missing date of birth
    let days = gari_quote::pricing::rental_days(req.pickup_at, req.dropoff_at);
    let date_of_birth =
        crate::profiles::resolve_date_of_birth(&state, &claims.sub, req.date_of_birth).await;
    let rules = state.business_rules.booking_rules();
    rules
        .evaluate(days, date_of_birth, Utc::now().date_naive())
        .map_err(rule_error)?;

    // 3. Calendar availability against non-cancelled bookings
    let existing = state
        .booking_repo
        .list_active_for_car(car.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let calendar =
        AvailabilityCalendar::from_ranges(existing.iter().map(|b| b.occupied_days()));
    let candidate = DateRange::new(req.pickup_at.date_naive(), req.dropoff_at.date_naive());
    if !calendar.is_free(candidate) {
        return Err(AppError::ConflictError(
            "Car is not available for the selected dates".to_string(),
        ));
    }

    // 4. Best-effort checkout hold; Redis being down must not block bookings
    match state
        .redis
        .acquire_checkout_hold(
            &car.id.to_string(),
            &claims.sub,
            state.business_rules.checkout_hold_seconds,
        )
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return Err(AppError::ConflictError(
                "Another renter is checking out this car, try again shortly".to_string(),
            ))
        }
        Err(e) => warn!("Checkout hold unavailable, proceeding without: {}", e),
    }

    // 5. Price and split. The booking fee is always the commission share:
    // it is the refundable base on cancellation even for prepaid rentals
    let calculator = QuoteCalculator::new(state.business_rules.pricing_config());
    let breakdown = calculator.price(days, car.price_per_day, req.with_insurance, req.cross_country);
    let (booking_fee, on_site_share) = calculator.pay_on_site_split(breakdown.total);
    let balance_on_site = if req.pay_on_site { on_site_share } else { 0.0 };

    // 6. Persist
    let booking = state
        .booking_repo
        .create_booking(BookingDraft {
            id: None,
            car_id: car.id,
            car_name: car.name.clone(),
            image_url: car.image_url.clone(),
            renter_id: claims.sub.clone(),
            owner_id: car.owner.id.clone(),
            pickup_at: req.pickup_at,
            dropoff_at: req.dropoff_at,
            pickup_location: req.pickup_location,
            dropoff_location: req.dropoff_location,
            days,
            total_price: breakdown.total,
            booking_fee,
            balance_on_site,
            payment_method: req.payment_method,
            pay_on_site: req.pay_on_site,
            created_at: None,
        })
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    // Checkout is over, let the next renter in
    let _ = state.redis.release_checkout_hold(&car.id.to_string()).await;

    info!("Booking created: {} ({})", booking.id, booking.reference);
    Ok(Json(booking))
}

/// GET /v1/bookings
/// The renter's bookings, oldest first
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .booking_repo
        .list_bookings(&claims.sub)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(Json(bookings))
}

/// GET /v1/bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;
    Ok(Json(booking))
}

/// POST /v1/bookings/:id/cancel
/// Cancel and price the refund from hours-to-pickup. The refund applies to
/// the booking fee only.
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    // 1. Fetch and verify ownership
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;

    // 2. Only live bookings can be cancelled
    if matches!(booking.status, BookingStatus::Completed | BookingStatus::Cancelled) {
        return Err(AppError::ConflictError(format!(
            "Booking is already {}",
            booking.status.as_str()
        )));
    }

    // 3. Price the refund
    let refund = state
        .business_rules
        .refund_policy()
        .quote(booking.booking_fee, booking.pickup_at, Utc::now());

    // 4. Transition and record
    state
        .booking_repo
        .update_status(booking_id, BookingStatus::Cancelled)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if refund.amount > 0.0 {
        let mut finance = state.finance.write().await;
        finance.record_refund(booking_id, &booking.owner_id, refund.amount, refund.percent);
    }

    // 5. Release the checkout hold and publish
    let _ = state.redis.release_checkout_hold(&booking.car_id.to_string()).await;

    let event = BookingCancelledEvent {
        booking_id,
        car_id: booking.car_id,
        refund_percent: refund.percent,
        refund_amount: refund.amount,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish("booking.cancelled", &booking_id.to_string(), &payload)
            .await;
    }

    info!(
        "Booking cancelled: {} ({}% refund of booking fee)",
        booking_id, refund.percent
    );

    Ok(Json(CancelBookingResponse {
        booking_id,
        status: BookingStatus::Cancelled.as_str().to_string(),
        refund,
    }))
}

pub(crate) async fn fetch_owned_booking(
    state: &AppState,
    booking_id: Uuid,
    renter_id: &str,
) -> Result<Booking, AppError> {
    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", booking_id)))?;

    if booking.renter_id != renter_id {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }
    Ok(booking)
}
