use crate::{CoreError, CoreResult};
use chrono::{Datelike, NaiveDate};
use gari_shared::pii::Masked;
use serde::{Deserialize, Serialize};

/// A renter's driver profile. Date of birth is optional: profiles created
/// through the guest flow have no DOB until the renter completes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: String,
    pub full_name: String,
    pub phone: Option<Masked<String>>,
    pub email: Option<Masked<String>>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Outcome of the driver age check.
///
/// `Unknown` (no date of birth on file) is deliberately distinct from
/// `Underage`: the first asks the renter to complete their profile, the
/// second is a hard block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeEligibility {
    Eligible,
    Underage,
    Unknown,
}

/// Age in whole years on `on`, decremented when the birthday has not yet
/// occurred that year. A driver whose birthday is `on` itself has already
/// turned.
pub fn driver_age(on: NaiveDate, date_of_birth: NaiveDate) -> i32 {
    let mut age = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Sanity checks shared by every surface that accepts profile edits.
pub fn validate_profile(profile: &DriverProfile) -> CoreResult<()> {
    if profile.full_name.trim().is_empty() {
        return Err(CoreError::ValidationError("Full name is required".to_string()));
    }
    if let Some(phone) = &profile.phone {
        // E.164, the format M-Pesa receipts come back with
        if !phone.0.starts_with('+') || phone.0.len() < 10 {
            return Err(CoreError::IdentityError(
                "Phone number must be in international format".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn check_age_eligibility(
    date_of_birth: Option<NaiveDate>,
    min_age: i32,
    today: NaiveDate,
) -> AgeEligibility {
    match date_of_birth {
        None => AgeEligibility::Unknown,
        Some(dob) => {
            if driver_age(today, dob) >= min_age {
                AgeEligibility::Eligible
            } else {
                AgeEligibility::Underage
            }
        }
    }
}
