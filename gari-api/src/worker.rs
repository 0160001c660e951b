use chrono::Utc;
use gari_order::finance::FinancialManager;
use gari_order::models::BookingStatus;
use gari_order::repository::BookingRepository;
use gari_order::tracking::{time_remaining, REFRESH_INTERVAL_SECS};
use gari_shared::models::events::RentalCompletedEvent;
use gari_store::EventProducer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Background rental lifecycle worker.
///
/// Ticks on the countdown refresh interval, completes active rentals whose
/// dropoff has passed, credits the owner with their share, and publishes
/// rental.completed. The car's calendar days free up as a side effect of
/// the status change.
pub async fn start_lifecycle_worker(
    repo: Arc<dyn BookingRepository>,
    finance: Arc<RwLock<FinancialManager>>,
    kafka: Arc<EventProducer>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));
    info!("Rental lifecycle worker started");

    loop {
        interval.tick().await;
        if let Err(e) = complete_overdue_rentals(&repo, &finance, &kafka).await {
            error!("Lifecycle sweep failed: {}", e);
        }
    }
}

/// One sweep: every active rental past its dropoff becomes Completed.
pub async fn complete_overdue_rentals(
    repo: &Arc<dyn BookingRepository>,
    finance: &Arc<RwLock<FinancialManager>>,
    kafka: &Arc<EventProducer>,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now();
    let mut completed = 0;

    for booking in repo.list_all().await? {
        if booking.status != BookingStatus::Active {
            continue;
        }
        if time_remaining(now, booking.dropoff_at).is_some() {
            continue;
        }

        repo.update_status(booking.id, BookingStatus::Completed).await?;

        // Owner's share is the total minus the platform commission; for
        // pay-on-site rentals this equals the balance collected at pickup
        let earnings = booking.total_price - booking.booking_fee;
        {
            let mut finance = finance.write().await;
            finance.record_rental_earnings(booking.id, &booking.owner_id, earnings);
        }

        let event = RentalCompletedEvent {
            booking_id: booking.id,
            car_id: booking.car_id,
            owner_id: booking.owner_id.clone(),
            owner_earnings: earnings,
            timestamp: now.timestamp(),
        };
        if let Ok(payload) = serde_json::to_string(&event) {
            let _ = kafka
                .publish("rental.completed", &booking.id.to_string(), &payload)
                .await;
        }

        info!("Rental completed: {} ({})", booking.id, booking.reference);
        completed += 1;
    }

    Ok(completed)
}
