use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gari_order::finance::{FinanceError, LedgerEntry, OwnerAccount};
use gari_shared::currency::format_kes;
use gari_shared::models::events::WithdrawalRequestedEvent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub owner_id: String,
    pub available_balance: f64,
    pub lifetime_earnings: f64,
    /// Display string, e.g. "KES 34,000"
    pub available_display: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub entry: LedgerEntry,
    pub remaining_balance: f64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/owners/{id}/balance", get(get_balance))
        .route("/v1/owners/{id}/withdrawals", post(request_withdrawal))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/owners/:id/balance
async fn get_balance(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let finance = state.finance.read().await;
    let account = finance
        .account(&owner_id)
        .cloned()
        .unwrap_or_else(|| empty_account(&owner_id));

    Ok(Json(balance_response(account)))
}

/// POST /v1/owners/:id/withdrawals
/// Pay out part of an owner's accrued balance
async fn request_withdrawal(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, AppError> {
    let mut finance = state.finance.write().await;

    let entry = finance.withdraw(&owner_id, req.amount).map_err(|e| match e {
        FinanceError::InsufficientBalance { .. } | FinanceError::NonPositiveAmount(_) => {
            AppError::ValidationError(e.to_string())
        }
        FinanceError::AccountNotFound(_) => AppError::NotFoundError(e.to_string()),
    })?;

    let remaining_balance = finance
        .account(&owner_id)
        .map(|a| a.available_balance)
        .unwrap_or(0.0);
    drop(finance);

    let event = WithdrawalRequestedEvent {
        owner_id: owner_id.clone(),
        amount: req.amount,
        remaining_balance,
        timestamp: Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish("withdrawal.requested", &owner_id, &payload)
            .await;
    }

    info!("Withdrawal of {} by {}", format_kes(req.amount), owner_id);
    Ok(Json(WithdrawalResponse {
        entry,
        remaining_balance,
    }))
}

fn empty_account(owner_id: &str) -> OwnerAccount {
    OwnerAccount {
        owner_id: owner_id.to_string(),
        available_balance: 0.0,
        lifetime_earnings: 0.0,
    }
}

fn balance_response(account: OwnerAccount) -> BalanceResponse {
    BalanceResponse {
        available_display: format_kes(account.available_balance),
        owner_id: account.owner_id,
        available_balance: account.available_balance,
        lifetime_earnings: account.lifetime_earnings,
    }
}
