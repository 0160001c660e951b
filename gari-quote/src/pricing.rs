use crate::models::{PaymentPlan, PriceBreakdown};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Platform commission taken out of the total (pay-on-site booking fee)
    pub commission_rate: f64,

    /// VAT rate already contained in all displayed prices
    pub vat_rate: f64,

    /// Daily collision-damage cover add-on, KES
    pub insurance_per_day: f64,

    /// Daily cross-border permit add-on, KES
    pub cross_country_per_day: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            commission_rate: 0.15,
            vat_rate: 0.16,
            insurance_per_day: 1500.0,
            cross_country_per_day: 5000.0,
        }
    }
}

/// Chargeable rental days: the pickup-to-dropoff span rounded up to whole
/// days, never negative. A dropoff at or before the pickup yields 0 and
/// blocks the booking upstream.
pub fn rental_days(pickup_at: DateTime<Utc>, dropoff_at: DateTime<Utc>) -> i64 {
    let seconds = (dropoff_at - pickup_at).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// Rental price calculator
pub struct QuoteCalculator {
    config: PricingConfig,
}

impl QuoteCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Full breakdown for a rental of `days` at `price_per_day`, with the
    /// selected add-ons. VAT is already included in every rate, so the
    /// subtotal is back-calculated for display.
    pub fn price(
        &self,
        days: i64,
        price_per_day: f64,
        with_insurance: bool,
        cross_country: bool,
    ) -> PriceBreakdown {
        let days_f = days.max(0) as f64;
        let base = days_f * price_per_day;
        let insurance = if with_insurance {
            days_f * self.config.insurance_per_day
        } else {
            0.0
        };
        let cross_country_total = if cross_country {
            days_f * self.config.cross_country_per_day
        } else {
            0.0
        };

        let total = base + insurance + cross_country_total;
        let subtotal = total / (1.0 + self.config.vat_rate);

        PriceBreakdown {
            days,
            base,
            insurance,
            cross_country: cross_country_total,
            total,
            subtotal,
            vat_amount: total - subtotal,
        }
    }

    /// Commission split for pay-on-site rentals. The balance is derived by
    /// subtraction so fee + balance reproduces the total exactly.
    pub fn pay_on_site_split(&self, total: f64) -> (f64, f64) {
        let booking_fee = total * self.config.commission_rate;
        (booking_fee, total - booking_fee)
    }

    /// The payment plan for a breakdown under the chosen collection mode.
    pub fn payment_plan(&self, breakdown: &PriceBreakdown, pay_on_site: bool) -> PaymentPlan {
        if pay_on_site {
            let (booking_fee, balance_on_site) = self.pay_on_site_split(breakdown.total);
            PaymentPlan::PayOnSite {
                booking_fee,
                balance_on_site,
            }
        } else {
            PaymentPlan::Full {
                amount: breakdown.total,
            }
        }
    }

    /// Convenience: price a car for a date range and wrap the result in a
    /// [`RentalQuote`]. Duration clamping happens here; gating rules are
    /// the caller's job.
    pub fn quote_for_car(
        &self,
        car: &gari_catalog::Car,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
        with_insurance: bool,
        cross_country: bool,
        pay_on_site: bool,
    ) -> crate::models::RentalQuote {
        let days = rental_days(pickup_at, dropoff_at);
        let breakdown = self.price(days, car.price_per_day, with_insurance, cross_country);
        let plan = self.payment_plan(&breakdown, pay_on_site);
        crate::models::RentalQuote::new(car.id, pickup_at, dropoff_at, breakdown, plan)
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }
}

impl Default for QuoteCalculator {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
