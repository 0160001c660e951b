use axum::{
    extract::{Extension, Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::stream::Stream;
use gari_order::models::BookingStatus;
use gari_order::tracking::{time_remaining, Countdown, REFRESH_INTERVAL_SECS};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::bookings::fetch_owned_booking;
use crate::error::AppError;
use crate::middleware::auth::RenterClaims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    pub booking_id: Uuid,
    pub status: String,
    pub dropoff_at: DateTime<Utc>,
    /// None once the dropoff time has passed
    pub remaining: Option<Countdown>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{id}/countdown", get(get_countdown))
        .route("/v1/bookings/{id}/countdown/stream", get(stream_countdown))
        .layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::auth::renter_auth_middleware,
        ))
}

/// GET /v1/bookings/:id/countdown
/// Snapshot of the time left on an active rental
async fn get_countdown(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<CountdownResponse>, AppError> {
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;

    if booking.status != BookingStatus::Active {
        return Err(AppError::ConflictError(format!(
            "Booking is {}, not an active rental",
            booking.status.as_str()
        )));
    }

    Ok(Json(CountdownResponse {
        booking_id,
        status: booking.status.as_str().to_string(),
        dropoff_at: booking.dropoff_at,
        remaining: time_remaining(Utc::now(), booking.dropoff_at),
    }))
}

/// GET /v1/bookings/:id/countdown/stream
/// SSE stream re-emitting the countdown once a minute, ending when the
/// rental runs out.
async fn stream_countdown(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let booking = fetch_owned_booking(&state, booking_id, &claims.sub).await?;

    if booking.status != BookingStatus::Active {
        return Err(AppError::ConflictError(format!(
            "Booking is {}, not an active rental",
            booking.status.as_str()
        )));
    }

    let dropoff_at = booking.dropoff_at;
    let interval = tokio::time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));

    let stream = tokio_stream::wrappers::IntervalStream::new(interval)
        .map(move |_| time_remaining(Utc::now(), dropoff_at))
        .take_while(|remaining| remaining.is_some())
        .map(|remaining| {
            let event = match serde_json::to_string(&remaining) {
                Ok(data) => Event::default().event("countdown").data(data),
                Err(_) => Event::default().event("countdown").data("null"),
            };
            Ok(event)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
