use async_trait::async_trait;
use gari_order::models::{Booking, BookingDraft, BookingStatus, BookingUpdate};
use gari_order::repository::BookingRepository;
use gari_order::store::BookingStore;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The ephemeral booking store behind the repository trait: bookings live
/// for the lifetime of the process. Default in development; the Postgres
/// repository replaces it when a database URL is configured.
pub struct InMemoryBookingRepository {
    inner: RwLock<BookingStore>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BookingStore::new()),
        }
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let mut store = self.inner.write().await;
        Ok(store.add(draft)?)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let store = self.inner.read().await;
        Ok(store.get(id).cloned())
    }

    async fn list_bookings(
        &self,
        renter_id: &str,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let store = self.inner.read().await;
        Ok(store.list_for_renter(renter_id))
    }

    async fn list_all(&self) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let store = self.inner.read().await;
        Ok(store.list().to_vec())
    }

    async fn list_active_for_car(
        &self,
        car_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let store = self.inner.read().await;
        Ok(store.active_for_car(car_id))
    }

    async fn update_booking(
        &self,
        id: Uuid,
        update: BookingUpdate,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let mut store = self.inner.write().await;
        Ok(store.update(id, update)?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let mut store = self.inner.write().await;
        Ok(store.update(
            id,
            BookingUpdate {
                status: Some(status),
                ..Default::default()
            },
        )?)
    }

    async fn remove_booking(&self, id: Uuid) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut store = self.inner.write().await;
        store.remove(id)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut store = self.inner.write().await;
        store.clear();
        Ok(())
    }
}
