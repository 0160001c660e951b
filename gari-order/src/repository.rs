use crate::models::{Booking, BookingDraft, BookingStatus, BookingUpdate};
use async_trait::async_trait;
use std::error::Error;
use uuid::Uuid;

/// Repository trait for booking data access. The in-memory store and the
/// Postgres store both implement it, so the API layer does not care where
/// bookings live.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<Booking, Box<dyn Error + Send + Sync>>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, Box<dyn Error + Send + Sync>>;

    async fn list_bookings(
        &self,
        renter_id: &str,
    ) -> Result<Vec<Booking>, Box<dyn Error + Send + Sync>>;

    /// Every booking in creation order, for lifecycle sweeps.
    async fn list_all(&self) -> Result<Vec<Booking>, Box<dyn Error + Send + Sync>>;

    /// Non-cancelled bookings on a car, for availability checks.
    async fn list_active_for_car(
        &self,
        car_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn Error + Send + Sync>>;

    async fn update_booking(
        &self,
        id: Uuid,
        update: BookingUpdate,
    ) -> Result<Booking, Box<dyn Error + Send + Sync>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Box<dyn Error + Send + Sync>>;

    async fn remove_booking(&self, id: Uuid) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>>;
}
