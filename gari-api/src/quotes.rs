use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use gari_quote::{rules::BookingRuleError, QuoteCalculator, RentalQuote};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    #[serde(default)]
    pub with_insurance: bool,
    #[serde(default)]
    pub cross_country: bool,
    #[serde(default)]
    pub pay_on_site: bool,
    pub date_of_birth: Option<NaiveDate>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/quotes", post(create_quote))
}

/// POST /v1/quotes
/// Price a candidate rental. Gating failures come back as distinct errors
/// so the client can show the right prompt.
async fn create_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<RentalQuote>, AppError> {
    // 1. The car must exist and be listed
    let car = state
        .car_repo
        .get_car(req.car_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFoundError(format!("Car not found: {}", req.car_id)))?;

    // 2. Gate on rental length and driver age
    let days = gari_quote::pricing::rental_days(req.pickup_at, req.dropoff_at);
    let rules = state.business_rules.booking_rules();
    rules
        .evaluate(days, req.date_of_birth, Utc::now().date_naive())
        .map_err(rule_error)?;

    // 3. Price it
    let calculator = QuoteCalculator::new(state.business_rules.pricing_config());
    let quote = calculator.quote_for_car(
        &car,
        req.pickup_at,
        req.dropoff_at,
        req.with_insurance,
        req.cross_country,
        req.pay_on_site,
    );

    Ok(Json(quote))
}

pub(crate) fn rule_error(err: BookingRuleError) -> AppError {
    match err {
        BookingRuleError::DateOfBirthMissing => {
            AppError::ProfileIncomplete("Add your date of birth to continue".to_string())
        }
        other => AppError::ValidationError(other.to_string()),
    }
}
