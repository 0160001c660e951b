use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    Electric,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transmission {
    Automatic,
    Manual,
}

/// The owner details surfaced alongside a listing. Contact data stays out
/// of this summary; it is only revealed to a confirmed renter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: String,
    pub name: String,
}

/// A listed rental car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    /// Daily rate in KES, VAT inclusive
    pub price_per_day: f64,
    pub seats: u8,
    pub fuel: FuelType,
    pub transmission: Transmission,
    pub image_url: String,
    pub owner: OwnerSummary,
    pub is_active: bool,
}

impl Car {
    pub fn new(
        name: &str,
        price_per_day: f64,
        seats: u8,
        fuel: FuelType,
        transmission: Transmission,
        owner: OwnerSummary,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price_per_day,
            seats,
            fuel,
            transmission,
            image_url: crate::media::car_photo_url(name),
            owner,
            is_active: true,
        }
    }
}
