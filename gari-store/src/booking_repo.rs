use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gari_core::payment::PaymentMethod;
use gari_order::models::{Booking, BookingDraft, BookingStatus, BookingUpdate};
use gari_order::repository::BookingRepository;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed booking repository. Queries are bound at runtime so the
/// crate builds without a live database.
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: String,
    car_id: Uuid,
    car_name: String,
    image_url: String,
    renter_id: String,
    owner_id: String,
    pickup_at: DateTime<Utc>,
    dropoff_at: DateTime<Utc>,
    pickup_location: String,
    dropoff_location: String,
    days: i64,
    total_price: f64,
    booking_fee: f64,
    balance_on_site: f64,
    payment_method: String,
    pay_on_site: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "SELECT id, reference, car_id, car_name, image_url, renter_id, owner_id, \
     pickup_at, dropoff_at, pickup_location, dropoff_location, days, total_price, \
     booking_fee, balance_on_site, payment_method, pay_on_site, status, created_at, updated_at \
     FROM bookings";

impl TryFrom<BookingRow> for Booking {
    type Error = String;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| format!("Unknown booking status: {}", row.status))?;
        let payment_method = PaymentMethod::parse(&row.payment_method)
            .ok_or_else(|| format!("Unknown payment method: {}", row.payment_method))?;

        Ok(Booking {
            id: row.id,
            reference: row.reference,
            car_id: row.car_id,
            car_name: row.car_name,
            image_url: row.image_url,
            renter_id: row.renter_id,
            owner_id: row.owner_id,
            pickup_at: row.pickup_at,
            dropoff_at: row.dropoff_at,
            pickup_location: row.pickup_location,
            dropoff_location: row.dropoff_location,
            days: row.days,
            total_price: row.total_price,
            booking_fee: row.booking_fee,
            balance_on_site: row.balance_on_site,
            payment_method,
            pay_on_site: row.pay_on_site,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        // Mirror the in-memory store: assign id and timestamps when absent
        let id = draft.id.unwrap_or_else(Uuid::new_v4);
        let created_at = draft.created_at.unwrap_or_else(Utc::now);
        let reference = gari_order::store::voucher_reference(&id);

        sqlx::query(
            r#"
            INSERT INTO bookings (id, reference, car_id, car_name, image_url, renter_id, owner_id,
                pickup_at, dropoff_at, pickup_location, dropoff_location, days, total_price,
                booking_fee, balance_on_site, payment_method, pay_on_site, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)
            "#,
        )
        .bind(id)
        .bind(&reference)
        .bind(draft.car_id)
        .bind(&draft.car_name)
        .bind(&draft.image_url)
        .bind(&draft.renter_id)
        .bind(&draft.owner_id)
        .bind(draft.pickup_at)
        .bind(draft.dropoff_at)
        .bind(&draft.pickup_location)
        .bind(&draft.dropoff_location)
        .bind(draft.days)
        .bind(draft.total_price)
        .bind(draft.booking_fee)
        .bind(draft.balance_on_site)
        .bind(draft.payment_method.as_str())
        .bind(draft.pay_on_site)
        .bind(BookingStatus::Pending.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        self.get_booking(id)
            .await?
            .ok_or_else(|| "Booking vanished after insert".into())
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(Booking::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_bookings(
        &self,
        renter_id: &str,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE renter_id = $1 ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Booking::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> =
            sqlx::query_as(&format!("{} ORDER BY created_at", SELECT_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| Booking::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn list_active_for_car(
        &self,
        car_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{} WHERE car_id = $1 AND status <> 'CANCELLED' ORDER BY created_at",
            SELECT_COLUMNS
        ))
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Booking::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn update_booking(
        &self,
        id: Uuid,
        update: BookingUpdate,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        // Shallow merge in application code; patches are rare enough that
        // read-modify-write beats dynamic SQL here
        let mut booking = self
            .get_booking(id)
            .await?
            .ok_or_else(|| format!("Booking not found: {}", id))?;
        booking.apply(update);

        sqlx::query(
            r#"
            UPDATE bookings
            SET pickup_at = $1, dropoff_at = $2, pickup_location = $3, dropoff_location = $4,
                payment_method = $5, status = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(booking.pickup_at)
        .bind(booking.dropoff_at)
        .bind(&booking.pickup_location)
        .bind(&booking.dropoff_location)
        .bind(booking.payment_method.as_str())
        .bind(booking.status.as_str())
        .bind(booking.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_booking(id)
            .await?
            .ok_or_else(|| format!("Booking not found: {}", id).into())
    }

    async fn remove_booking(&self, id: Uuid) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM bookings").execute(&self.pool).await?;
        Ok(())
    }
}
