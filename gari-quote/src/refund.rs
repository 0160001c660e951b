use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cancellation refund tiers, measured in whole hours between the
/// cancellation time and the pickup time. The refundable base is the
/// booking fee, not the full rental price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundPolicy {
    /// Strictly more than this many hours out: full refund
    pub full_refund_hours: i64,
    /// At least this many hours out (and not in the full tier): half refund
    pub half_refund_hours: i64,
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self {
            full_refund_hours: 48,
            half_refund_hours: 24,
        }
    }
}

/// Refund percentage for a cancellation `hours_to_pickup` hours out.
/// Exactly 48h falls in the 50% tier, exactly 24h as well; below 24h
/// nothing is returned.
pub fn refund_percent(policy: &RefundPolicy, hours_to_pickup: i64) -> u8 {
    if hours_to_pickup > policy.full_refund_hours {
        100
    } else if hours_to_pickup >= policy.half_refund_hours {
        50
    } else {
        0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundQuote {
    pub hours_to_pickup: i64,
    pub percent: u8,
    pub amount: f64,
}

impl RefundPolicy {
    /// Price a cancellation happening `now` against `pickup_at`, refunding
    /// a share of `booking_fee`.
    pub fn quote(
        &self,
        booking_fee: f64,
        pickup_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RefundQuote {
        let hours_to_pickup = (pickup_at - now).num_hours();
        let percent = refund_percent(self, hours_to_pickup);
        RefundQuote {
            hours_to_pickup,
            percent,
            amount: booking_fee * (percent as f64) / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_tier_step_function() {
        let policy = RefundPolicy::default();
        assert_eq!(refund_percent(&policy, 49), 100);
        assert_eq!(refund_percent(&policy, 30), 50);
        assert_eq!(refund_percent(&policy, 10), 0);
    }

    #[test]
    fn test_boundaries_use_strict_upper_inclusive_lower() {
        let policy = RefundPolicy::default();
        // Exactly 48h: not strictly more than 48 -> half tier
        assert_eq!(refund_percent(&policy, 48), 50);
        // Exactly 24h: still in the half tier
        assert_eq!(refund_percent(&policy, 24), 50);
        assert_eq!(refund_percent(&policy, 23), 0);
    }

    #[test]
    fn test_refund_is_share_of_booking_fee() {
        let policy = RefundPolicy::default();
        let now = Utc::now();

        let quote = policy.quote(6_000.0, now + Duration::hours(30), now);
        assert_eq!(quote.percent, 50);
        assert_eq!(quote.amount, 3_000.0);

        let quote = policy.quote(6_000.0, now + Duration::hours(72), now);
        assert_eq!(quote.percent, 100);
        assert_eq!(quote.amount, 6_000.0);

        let quote = policy.quote(6_000.0, now + Duration::hours(2), now);
        assert_eq!(quote.percent, 0);
        assert_eq!(quote.amount, 0.0);
    }

    #[test]
    fn test_pickup_in_the_past_refunds_nothing() {
        let policy = RefundPolicy::default();
        let now = Utc::now();
        let quote = policy.quote(6_000.0, now - Duration::hours(5), now);
        assert_eq!(quote.percent, 0);
    }
}
