use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use gari_core::identity::{validate_profile, DriverProfile};
use gari_shared::pii::Masked;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::auth::RenterClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile).put(upsert_profile))
        .layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::auth::renter_auth_middleware,
        ))
}

/// GET /v1/profile
async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
) -> Result<Json<DriverProfile>, AppError> {
    let profiles = state.profiles.read().await;
    let profile = profiles
        .get(&claims.sub)
        .cloned()
        .ok_or_else(|| AppError::NotFoundError("No profile on file".to_string()))?;
    Ok(Json(profile))
}

/// PUT /v1/profile
/// Create or replace the renter's driver profile. The stored date of birth
/// feeds age gating when a booking request doesn't carry one.
async fn upsert_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<RenterClaims>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<DriverProfile>, AppError> {
    let profile = DriverProfile {
        id: claims.sub.clone(),
        full_name: req.full_name,
        phone: req.phone.map(Masked),
        email: req.email.map(Masked),
        date_of_birth: req.date_of_birth,
    };
    validate_profile(&profile).map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut profiles = state.profiles.write().await;
    profiles.insert(claims.sub, profile.clone());
    Ok(Json(profile))
}

/// The date of birth to gate on: the one in the request wins, the stored
/// profile backs it up.
pub(crate) async fn resolve_date_of_birth(
    state: &AppState,
    renter_id: &str,
    from_request: Option<NaiveDate>,
) -> Option<NaiveDate> {
    if from_request.is_some() {
        return from_request;
    }
    let profiles = state.profiles.read().await;
    profiles.get(renter_id).and_then(|p| p.date_of_birth)
}
