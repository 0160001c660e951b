use chrono::NaiveDate;
use gari_core::identity::{check_age_eligibility, driver_age, AgeEligibility};
use serde::{Deserialize, Serialize};

/// Gating rules a rental request must pass before it can be priced into a
/// booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRules {
    pub min_rental_days: i64,
    pub min_driver_age: i32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            min_rental_days: 3,
            min_driver_age: 25,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BookingRuleError {
    #[error("Rental of {days} day(s) is below the {min_days}-day minimum")]
    RentalTooShort { days: i64, min_days: i64 },

    #[error("Driver aged {age} is below the minimum age of {min_age}")]
    DriverUnderage { age: i32, min_age: i32 },

    /// Distinct from `DriverUnderage`: the renter has not provided a date
    /// of birth yet and should be prompted to complete their profile.
    #[error("Driver date of birth is not on file")]
    DateOfBirthMissing,
}

impl BookingRules {
    /// Check a candidate rental. `days` comes out of
    /// [`crate::pricing::rental_days`], so an inverted date range arrives
    /// here as 0 and fails the minimum-length rule.
    pub fn evaluate(
        &self,
        days: i64,
        date_of_birth: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(), BookingRuleError> {
        if days < self.min_rental_days {
            return Err(BookingRuleError::RentalTooShort {
                days,
                min_days: self.min_rental_days,
            });
        }

        match check_age_eligibility(date_of_birth, self.min_driver_age, today) {
            AgeEligibility::Eligible => Ok(()),
            AgeEligibility::Unknown => Err(BookingRuleError::DateOfBirthMissing),
            AgeEligibility::Underage => {
                // date_of_birth must be Some here, Unknown covers None
                let age = date_of_birth.map(|dob| driver_age(today, dob)).unwrap_or(0);
                Err(BookingRuleError::DriverUnderage {
                    age,
                    min_age: self.min_driver_age,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_short_rentals_are_rejected() {
        let rules = BookingRules::default();
        let today = date(2025, 6, 1);
        let dob = Some(date(1990, 1, 1));

        assert_eq!(
            rules.evaluate(2, dob, today),
            Err(BookingRuleError::RentalTooShort { days: 2, min_days: 3 })
        );
        assert_eq!(
            rules.evaluate(0, dob, today),
            Err(BookingRuleError::RentalTooShort { days: 0, min_days: 3 })
        );
        assert!(rules.evaluate(3, dob, today).is_ok());
    }

    #[test]
    fn test_underage_driver_is_hard_blocked() {
        let rules = BookingRules::default();
        let today = date(2025, 6, 1);

        assert_eq!(
            rules.evaluate(5, Some(date(2003, 6, 2)), today),
            Err(BookingRuleError::DriverUnderage { age: 21, min_age: 25 })
        );
    }

    #[test]
    fn test_missing_dob_is_a_distinct_outcome() {
        let rules = BookingRules::default();
        let today = date(2025, 6, 1);

        assert_eq!(
            rules.evaluate(5, None, today),
            Err(BookingRuleError::DateOfBirthMissing)
        );
    }

    #[test]
    fn test_length_rule_fires_before_age_rule() {
        let rules = BookingRules::default();
        let today = date(2025, 6, 1);

        // Both rules violated: the length rejection wins
        assert_eq!(
            rules.evaluate(1, None, today),
            Err(BookingRuleError::RentalTooShort { days: 1, min_days: 3 })
        );
    }
}
