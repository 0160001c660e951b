use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use gari_catalog::availability::{AvailabilityCalendar, DateRange};
use gari_catalog::{media, Car};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FleetResponse {
    pub cars: Vec<Car>,
    pub showcase_video_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub pickup_date: NaiveDate,
    pub dropoff_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub car_id: Uuid,
    pub available: bool,
    pub conflicting_days: Vec<NaiveDate>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cars", get(list_cars))
        .route("/v1/cars/{id}", get(get_car))
        .route("/v1/cars/{id}/availability", get(check_availability))
}

/// GET /v1/cars
/// The bookable fleet
async fn list_cars(State(state): State<AppState>) -> Result<Json<FleetResponse>, AppError> {
    let cars = state
        .car_repo
        .list_cars()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(FleetResponse {
        cars,
        showcase_video_url: media::showcase_video_url().to_string(),
    }))
}

/// GET /v1/cars/:id
async fn get_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    let car = state
        .car_repo
        .get_car(car_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Car not found: {}", car_id)))?;

    Ok(Json(car))
}

/// GET /v1/cars/:id/availability?pickup_date=..&dropoff_date=..
/// Calendar-day availability against the car's non-cancelled bookings
async fn check_availability(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    // 1. Verify the car exists
    state
        .car_repo
        .get_car(car_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Car not found: {}", car_id)))?;

    // 2. Build the booked-day calendar from non-cancelled bookings
    let existing = state
        .booking_repo
        .list_active_for_car(car_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let calendar =
        AvailabilityCalendar::from_ranges(existing.iter().map(|b| b.occupied_days()));

    // 3. Intersect with the candidate range
    let candidate = DateRange::new(query.pickup_date, query.dropoff_date);
    let conflicting_days = calendar.conflicting_days(candidate);

    Ok(Json(AvailabilityResponse {
        car_id,
        available: conflicting_days.is_empty(),
        conflicting_days,
    }))
}
