use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The platform's cut of a rental and what is left for the owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CommissionSplit {
    pub booking_fee: f64,
    pub owner_balance: f64,
}

impl CommissionSplit {
    /// Split a VAT-inclusive total at `rate`. The owner balance is derived
    /// by subtraction: fee + balance reproduces the total exactly.
    pub fn of(total: f64, rate: f64) -> Self {
        let booking_fee = total * rate;
        Self {
            booking_fee,
            owner_balance: total - booking_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub owner_id: String,
    pub transaction_type: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    fn new(
        booking_id: Option<Uuid>,
        owner_id: &str,
        transaction_type: &str,
        amount: f64,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            owner_id: owner_id.to_string(),
            transaction_type: transaction_type.to_string(),
            amount,
            currency: "KES".to_string(),
            description,
            created_at: Utc::now(),
        }
    }
}

/// An owner's withdrawable balance on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerAccount {
    pub owner_id: String,
    pub available_balance: f64,
    pub lifetime_earnings: f64,
}

impl OwnerAccount {
    fn new(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            available_balance: 0.0,
            lifetime_earnings: 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    #[error("Owner account not found: {0}")]
    AccountNotFound(String),

    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Withdrawal amount must be positive, got {0:.2}")]
    NonPositiveAmount(f64),
}

/// Handles owner earnings and withdrawals.
///
/// Earnings accrue when a rental completes; refunds and withdrawals append
/// ledger entries so every shilling that moved is accounted for.
pub struct FinancialManager {
    accounts: HashMap<String, OwnerAccount>,
    ledger: Vec<LedgerEntry>,
}

impl FinancialManager {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            ledger: Vec::new(),
        }
    }

    pub fn account(&self, owner_id: &str) -> Option<&OwnerAccount> {
        self.accounts.get(owner_id)
    }

    pub fn ledger_for_booking(&self, booking_id: Uuid) -> Vec<&LedgerEntry> {
        self.ledger
            .iter()
            .filter(|e| e.booking_id == Some(booking_id))
            .collect()
    }

    /// Credit an owner with their share of a completed rental.
    pub fn record_rental_earnings(
        &mut self,
        booking_id: Uuid,
        owner_id: &str,
        amount: f64,
    ) -> LedgerEntry {
        let account = self
            .accounts
            .entry(owner_id.to_string())
            .or_insert_with(|| OwnerAccount::new(owner_id));
        account.available_balance += amount;
        account.lifetime_earnings += amount;

        let entry = LedgerEntry::new(
            Some(booking_id),
            owner_id,
            "RENTAL_EARNINGS",
            amount,
            Some(format!("Earnings for booking {}", booking_id)),
        );
        self.ledger.push(entry.clone());
        entry
    }

    /// Record a cancellation refund paid back to the renter.
    pub fn record_refund(
        &mut self,
        booking_id: Uuid,
        owner_id: &str,
        amount: f64,
        percent: u8,
    ) -> LedgerEntry {
        let entry = LedgerEntry::new(
            Some(booking_id),
            owner_id,
            "CANCELLATION_REFUND",
            -amount,
            Some(format!("{}% refund of the booking fee", percent)),
        );
        self.ledger.push(entry.clone());
        entry
    }

    /// Pay out part of an owner's balance.
    pub fn withdraw(&mut self, owner_id: &str, amount: f64) -> Result<LedgerEntry, FinanceError> {
        if amount <= 0.0 {
            return Err(FinanceError::NonPositiveAmount(amount));
        }

        let account = self
            .accounts
            .get_mut(owner_id)
            .ok_or_else(|| FinanceError::AccountNotFound(owner_id.to_string()))?;

        if amount > account.available_balance {
            return Err(FinanceError::InsufficientBalance {
                requested: amount,
                available: account.available_balance,
            });
        }

        account.available_balance -= amount;

        let entry = LedgerEntry::new(
            None,
            owner_id,
            "WITHDRAWAL",
            -amount,
            Some("Owner payout".to_string()),
        );
        self.ledger.push(entry.clone());
        Ok(entry)
    }
}

impl Default for FinancialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reproduces_total_exactly() {
        let split = CommissionSplit::of(40_000.0, 0.15);
        assert_eq!(split.booking_fee, 6_000.0);
        assert_eq!(split.owner_balance, 34_000.0);
        assert_eq!(split.booking_fee + split.owner_balance, 40_000.0);

        // Holds even for totals that don't divide cleanly
        let split = CommissionSplit::of(10_333.33, 0.15);
        assert_eq!(split.booking_fee + split.owner_balance, 10_333.33);
    }

    #[test]
    fn test_earnings_accrue_to_owner_balance() {
        let mut manager = FinancialManager::new();
        let booking_id = Uuid::new_v4();

        manager.record_rental_earnings(booking_id, "owner-1", 8_925.0);
        manager.record_rental_earnings(Uuid::new_v4(), "owner-1", 5_000.0);

        let account = manager.account("owner-1").unwrap();
        assert_eq!(account.available_balance, 13_925.0);
        assert_eq!(account.lifetime_earnings, 13_925.0);
        assert_eq!(manager.ledger_for_booking(booking_id).len(), 1);
    }

    #[test]
    fn test_withdrawal_reduces_balance() {
        let mut manager = FinancialManager::new();
        manager.record_rental_earnings(Uuid::new_v4(), "owner-1", 10_000.0);

        let entry = manager.withdraw("owner-1", 4_000.0).unwrap();
        assert_eq!(entry.amount, -4_000.0);
        assert_eq!(manager.account("owner-1").unwrap().available_balance, 6_000.0);
        // Lifetime earnings are not touched by payouts
        assert_eq!(manager.account("owner-1").unwrap().lifetime_earnings, 10_000.0);
    }

    #[test]
    fn test_overdrawn_withdrawal_is_rejected() {
        let mut manager = FinancialManager::new();
        manager.record_rental_earnings(Uuid::new_v4(), "owner-1", 1_000.0);

        let err = manager.withdraw("owner-1", 5_000.0).unwrap_err();
        assert!(matches!(err, FinanceError::InsufficientBalance { .. }));
        // Balance unchanged after the failed attempt
        assert_eq!(manager.account("owner-1").unwrap().available_balance, 1_000.0);
    }

    #[test]
    fn test_zero_and_negative_withdrawals_are_rejected() {
        let mut manager = FinancialManager::new();
        manager.record_rental_earnings(Uuid::new_v4(), "owner-1", 1_000.0);

        assert!(matches!(
            manager.withdraw("owner-1", 0.0),
            Err(FinanceError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            manager.withdraw("owner-1", -10.0),
            Err(FinanceError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_unknown_owner_cannot_withdraw() {
        let mut manager = FinancialManager::new();
        assert!(matches!(
            manager.withdraw("owner-ghost", 100.0),
            Err(FinanceError::AccountNotFound(_))
        ));
    }
}
