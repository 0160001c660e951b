use gari_core::payment::{PaymentAdapter, PaymentIntent, PaymentMethod, PaymentStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Insufficient wallet balance: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    /// Transient provider failure; the caller may retry.
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

/// Routes a charge to the right channel: wallet debits are settled
/// internally, card and M-Pesa charges go through the provider adapter.
pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
    wallets: RwLock<HashMap<String, f64>>,
    /// Balance a wallet opens with the first time it is touched
    starting_wallet_balance: f64,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>, starting_wallet_balance: f64) -> Self {
        Self {
            adapter,
            wallets: RwLock::new(HashMap::new()),
            starting_wallet_balance,
        }
    }

    /// Initialize a payment intent for a booking
    pub async fn initialize_payment(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        self.adapter.create_intent(booking_id, amount, currency).await
    }

    /// Charge a renter. Pay-on-site fees ride the same provider channels;
    /// only the amount differs, and the caller sets it on the intent.
    pub async fn charge(
        &self,
        renter_id: &str,
        method: PaymentMethod,
        intent: &PaymentIntent,
    ) -> Result<PaymentStatus, PaymentError> {
        match method {
            PaymentMethod::Wallet => self.debit_wallet(renter_id, intent.amount).await,
            _ => self
                .adapter
                .process_payment(intent)
                .await
                .map_err(|e| PaymentError::Gateway(e.to_string())),
        }
    }

    pub async fn wallet_balance(&self, renter_id: &str) -> f64 {
        let mut wallets = self.wallets.write().await;
        *wallets
            .entry(renter_id.to_string())
            .or_insert(self.starting_wallet_balance)
    }

    async fn debit_wallet(&self, renter_id: &str, amount: f64) -> Result<PaymentStatus, PaymentError> {
        let mut wallets = self.wallets.write().await;
        let balance = wallets
            .entry(renter_id.to_string())
            .or_insert(self.starting_wallet_balance);

        if amount > *balance {
            return Err(PaymentError::InsufficientFunds {
                requested: amount,
                available: *balance,
            });
        }

        *balance -= amount;
        Ok(PaymentStatus::Succeeded)
    }
}

/// Reference value that makes the mock gateway fail, for exercising the
/// transient-failure path end to end.
pub const GATEWAY_FAIL_REFERENCE: &str = "fail-gateway";

/// Stand-in for the card/M-Pesa provider. Sleeps briefly to behave like a
/// real round trip.
pub struct MockGatewayAdapter {
    latency: Duration,
}

impl MockGatewayAdapter {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(150),
        }
    }
}

impl Default for MockGatewayAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentAdapter for MockGatewayAdapter {
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(PaymentIntent {
            // Encode booking_id in the intent id so the mock can "remember" it
            id: format!("mock_pi_{}", booking_id.simple()),
            booking_id,
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::RequiresPaymentMethod,
            reference: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn get_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, Box<dyn std::error::Error + Send + Sync>> {
        let booking_id_str = intent_id.strip_prefix("mock_pi_").unwrap_or_default();
        let booking_id = Uuid::parse_str(booking_id_str).unwrap_or_else(|_| Uuid::new_v4());

        Ok(PaymentIntent {
            id: intent_id.to_string(),
            booking_id,
            amount: 0.0,
            currency: "KES".to_string(),
            status: PaymentStatus::Succeeded,
            reference: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn process_payment(
        &self,
        payment: &PaymentIntent,
    ) -> Result<PaymentStatus, Box<dyn std::error::Error + Send + Sync>> {
        // Simulated provider round trip
        sleep(self.latency).await;

        if payment.reference.as_deref() == Some(GATEWAY_FAIL_REFERENCE) {
            return Err("Simulated payment gateway failure".into());
        }
        Ok(PaymentStatus::Succeeded)
    }
}
