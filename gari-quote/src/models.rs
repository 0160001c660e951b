use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price breakdown for a rental. All amounts are KES, VAT inclusive;
/// `subtotal` and `vat_amount` exist for display only and always
/// reconstruct `total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub days: i64,
    pub base: f64,
    pub insurance: f64,
    pub cross_country: f64,
    pub total: f64,
    /// `total` with the included VAT backed out
    pub subtotal: f64,
    pub vat_amount: f64,
}

/// How the quoted total is collected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "plan")]
pub enum PaymentPlan {
    /// Whole amount charged at booking time
    Full { amount: f64 },
    /// Commission charged now, balance handed to the owner at pickup
    PayOnSite { booking_fee: f64, balance_on_site: f64 },
}

/// A priced rental proposal for one car and date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalQuote {
    pub id: Uuid,
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub breakdown: PriceBreakdown,
    pub payment_plan: PaymentPlan,
    pub created_at: DateTime<Utc>,
}

impl RentalQuote {
    pub fn new(
        car_id: Uuid,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
        breakdown: PriceBreakdown,
        payment_plan: PaymentPlan,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            car_id,
            pickup_at,
            dropoff_at,
            breakdown,
            payment_plan,
            created_at: Utc::now(),
        }
    }
}
