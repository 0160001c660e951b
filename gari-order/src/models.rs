use chrono::{DateTime, NaiveDate, Utc};
use gari_catalog::availability::DateRange;
use gari_core::payment::PaymentMethod;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "ACTIVE" => Some(BookingStatus::Active),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A confirmed (or in-flight) car rental. Car name and image are
/// snapshotted at booking time so history survives listing edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-facing code shown on the booking voucher, e.g. "GR-7F3A21"
    pub reference: String,
    pub car_id: Uuid,
    pub car_name: String,
    pub image_url: String,
    pub renter_id: String,
    pub owner_id: String,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub days: i64,
    /// VAT-inclusive rental total, KES
    pub total_price: f64,
    /// Commission component collected at booking time
    pub booking_fee: f64,
    /// Remainder due to the owner at pickup (0 unless pay-on-site)
    pub balance_on_site: f64,
    pub payment_method: PaymentMethod,
    pub pay_on_site: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The calendar days this booking occupies on the car, inclusive.
    pub fn occupied_days(&self) -> DateRange {
        DateRange::new(self.pickup_at.date_naive(), self.dropoff_at.date_naive())
    }

    pub fn pickup_date(&self) -> NaiveDate {
        self.pickup_at.date_naive()
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    /// Shallow-merge a patch into this booking.
    pub fn apply(&mut self, update: BookingUpdate) {
        if let Some(pickup_at) = update.pickup_at {
            self.pickup_at = pickup_at;
        }
        if let Some(dropoff_at) = update.dropoff_at {
            self.dropoff_at = dropoff_at;
        }
        if let Some(pickup_location) = update.pickup_location {
            self.pickup_location = pickup_location;
        }
        if let Some(dropoff_location) = update.dropoff_location {
            self.dropoff_location = dropoff_location;
        }
        if let Some(payment_method) = update.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a booking. `id` and `created_at` are assigned by the
/// store when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub id: Option<Uuid>,
    pub car_id: Uuid,
    pub car_name: String,
    pub image_url: String,
    pub renter_id: String,
    pub owner_id: String,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub days: i64,
    pub total_price: f64,
    pub booking_fee: f64,
    pub balance_on_site: f64,
    pub payment_method: PaymentMethod,
    pub pay_on_site: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// All-optional patch for shallow-merge updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    pub pickup_at: Option<DateTime<Utc>>,
    pub dropoff_at: Option<DateTime<Utc>>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<BookingStatus>,
}
