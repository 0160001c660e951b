use crate::models::{Booking, BookingDraft, BookingStatus, BookingUpdate};
use chrono::Utc;
use uuid::Uuid;

/// Manages the booking list and its state transitions.
///
/// Insertion-ordered: listings come back in the order bookings were
/// created. Single-writer; callers needing shared access wrap the store in
/// an async lock.
pub struct BookingStore {
    bookings: Vec<Booking>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: Vec::new(),
        }
    }

    /// Create a booking from a draft, assigning id, reference and creation
    /// timestamp when the draft omits them. New bookings start Pending.
    pub fn add(&mut self, draft: BookingDraft) -> Result<Booking, StoreError> {
        let id = draft.id.unwrap_or_else(Uuid::new_v4);
        if self.bookings.iter().any(|b| b.id == id) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
        let created_at = draft.created_at.unwrap_or_else(Utc::now);

        let booking = Booking {
            id,
            reference: voucher_reference(&id),
            car_id: draft.car_id,
            car_name: draft.car_name,
            image_url: draft.image_url,
            renter_id: draft.renter_id,
            owner_id: draft.owner_id,
            pickup_at: draft.pickup_at,
            dropoff_at: draft.dropoff_at,
            pickup_location: draft.pickup_location,
            dropoff_location: draft.dropoff_location,
            days: draft.days,
            total_price: draft.total_price,
            booking_fee: draft.booking_fee,
            balance_on_site: draft.balance_on_site,
            payment_method: draft.payment_method,
            pay_on_site: draft.pay_on_site,
            status: BookingStatus::Pending,
            created_at,
            updated_at: created_at,
        };

        self.bookings.push(booking.clone());
        Ok(booking)
    }

    pub fn get(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn list(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn list_for_renter(&self, renter_id: &str) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.renter_id == renter_id)
            .cloned()
            .collect()
    }

    /// Non-cancelled bookings on a car, for availability checks.
    pub fn active_for_car(&self, car_id: Uuid) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.car_id == car_id && b.status != BookingStatus::Cancelled)
            .cloned()
            .collect()
    }

    /// Shallow-merge a patch into the booking with this id.
    pub fn update(&mut self, id: Uuid, update: BookingUpdate) -> Result<Booking, StoreError> {
        let booking = self.get_mut(id)?;
        booking.apply(update);
        Ok(booking.clone())
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Booking, StoreError> {
        let pos = self
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.bookings.remove(pos))
    }

    pub fn clear(&mut self) {
        self.bookings.clear();
    }

    /// Transition: Pending → Active (payment confirmed)
    pub fn activate(&mut self, id: Uuid) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::Pending, BookingStatus::Active)
    }

    /// Transition: Active → Completed (dropoff reached)
    pub fn complete(&mut self, id: Uuid) -> Result<Booking, StoreError> {
        self.transition(id, BookingStatus::Active, BookingStatus::Completed)
    }

    /// Cancel a booking (Pending or Active only)
    pub fn cancel(&mut self, id: Uuid) -> Result<Booking, StoreError> {
        let booking = self.get_mut(id)?;
        if matches!(booking.status, BookingStatus::Completed | BookingStatus::Cancelled) {
            return Err(StoreError::InvalidTransition {
                from: format!("{:?}", booking.status),
                to: "CANCELLED".to_string(),
            });
        }
        booking.update_status(BookingStatus::Cancelled);
        Ok(booking.clone())
    }

    fn transition(
        &mut self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let booking = self.get_mut(id)?;
        if booking.status != expected {
            return Err(StoreError::InvalidTransition {
                from: format!("{:?}", booking.status),
                to: format!("{:?}", next),
            });
        }
        booking.update_status(next);
        Ok(booking.clone())
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Booking, StoreError> {
        self.bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Voucher code derived from the booking id, e.g. "GR-7F3A21"
pub fn voucher_reference(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    format!("GR-{}", hex[..6].to_uppercase())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Booking already exists: {0}")]
    DuplicateId(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gari_core::payment::PaymentMethod;

    fn draft(renter: &str) -> BookingDraft {
        let now = Utc::now();
        BookingDraft {
            id: None,
            car_id: Uuid::new_v4(),
            car_name: "Toyota Axio".to_string(),
            image_url: "https://example.test/axio.jpg".to_string(),
            renter_id: renter.to_string(),
            owner_id: "owner-1".to_string(),
            pickup_at: now + Duration::days(2),
            dropoff_at: now + Duration::days(5),
            pickup_location: "Nairobi CBD".to_string(),
            dropoff_location: "Nairobi CBD".to_string(),
            days: 3,
            total_price: 10_500.0,
            booking_fee: 1_575.0,
            balance_on_site: 8_925.0,
            payment_method: PaymentMethod::Mpesa,
            pay_on_site: true,
            created_at: None,
        }
    }

    #[test]
    fn test_add_assigns_id_reference_and_timestamp() {
        let mut store = BookingStore::new();
        let booking = store.add(draft("renter-1")).unwrap();

        assert!(booking.reference.starts_with("GR-"));
        assert_eq!(booking.reference.len(), 9);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(store.get(booking.id).is_some());
    }

    #[test]
    fn test_listing_preserves_insertion_order() {
        let mut store = BookingStore::new();
        let first = store.add(draft("renter-1")).unwrap();
        let second = store.add(draft("renter-2")).unwrap();
        let third = store.add(draft("renter-1")).unwrap();

        let ids: Vec<Uuid> = store.list().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);

        let mine = store.list_for_renter("renter-1");
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, first.id);
        assert_eq!(mine[1].id, third.id);
    }

    #[test]
    fn test_update_is_a_shallow_merge() {
        let mut store = BookingStore::new();
        let booking = store.add(draft("renter-1")).unwrap();

        let updated = store
            .update(
                booking.id,
                BookingUpdate {
                    pickup_location: Some("JKIA Terminal 1".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        // Patched field changes, everything else is untouched
        assert_eq!(updated.pickup_location, "JKIA Terminal 1");
        assert_eq!(updated.dropoff_location, "Nairobi CBD");
        assert_eq!(updated.total_price, 10_500.0);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = BookingStore::new();
        let booking = store.add(draft("renter-1")).unwrap();
        store.add(draft("renter-2")).unwrap();

        store.remove(booking.id).unwrap();
        assert!(store.get(booking.id).is_none());
        assert_eq!(store.list().len(), 1);

        store.clear();
        assert!(store.list().is_empty());

        assert!(matches!(
            store.remove(booking.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut store = BookingStore::new();
        let booking = store.add(draft("renter-1")).unwrap();

        store.activate(booking.id).unwrap();
        assert_eq!(store.get(booking.id).unwrap().status, BookingStatus::Active);

        store.complete(booking.id).unwrap();
        assert_eq!(store.get(booking.id).unwrap().status, BookingStatus::Completed);

        // Completed bookings cannot be cancelled
        assert!(matches!(
            store.cancel(booking.id),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cannot_complete_before_activation() {
        let mut store = BookingStore::new();
        let booking = store.add(draft("renter-1")).unwrap();

        assert!(matches!(
            store.complete(booking.id),
            Err(StoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancelled_bookings_free_the_car() {
        let mut store = BookingStore::new();
        let d = draft("renter-1");
        let car_id = d.car_id;
        let booking = store.add(d).unwrap();

        assert_eq!(store.active_for_car(car_id).len(), 1);
        store.cancel(booking.id).unwrap();
        assert!(store.active_for_car(car_id).is_empty());
    }
}
