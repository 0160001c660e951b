use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often countdown consumers (the SSE stream and the lifecycle worker)
/// re-evaluate, in seconds.
pub const REFRESH_INTERVAL_SECS: u64 = 60;

/// Time left on an active rental, broken down for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    pub fn total_minutes(&self) -> i64 {
        (self.days * 24 + self.hours) * 60 + self.minutes
    }
}

/// Remaining time until `dropoff_at`, or `None` once it has passed.
/// Sub-minute remainders round up so the display never shows 0d 0h 0m
/// while time is actually left.
pub fn time_remaining(now: DateTime<Utc>, dropoff_at: DateTime<Utc>) -> Option<Countdown> {
    let seconds = (dropoff_at - now).num_seconds();
    if seconds <= 0 {
        return None;
    }

    let total_minutes = (seconds + 59) / 60;
    Some(Countdown {
        days: total_minutes / (24 * 60),
        hours: (total_minutes / 60) % 24,
        minutes: total_minutes % 60,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_breakdown_of_remaining_time() {
        let now = Utc::now();
        let dropoff = now + Duration::days(2) + Duration::hours(5) + Duration::minutes(30);

        let countdown = time_remaining(now, dropoff).unwrap();
        assert_eq!(countdown, Countdown { days: 2, hours: 5, minutes: 30 });
        assert_eq!(countdown.total_minutes(), 2 * 24 * 60 + 5 * 60 + 30);
    }

    #[test]
    fn test_sub_minute_remainder_rounds_up() {
        let now = Utc::now();
        let countdown = time_remaining(now, now + Duration::seconds(30)).unwrap();
        assert_eq!(countdown, Countdown { days: 0, hours: 0, minutes: 1 });
    }

    #[test]
    fn test_past_dropoff_yields_none() {
        let now = Utc::now();
        assert!(time_remaining(now, now).is_none());
        assert!(time_remaining(now, now - Duration::minutes(1)).is_none());
    }
}
