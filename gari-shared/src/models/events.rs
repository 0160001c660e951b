use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub car_id: Uuid,
    pub renter_id: String,
    pub total_price: f64,
    pub pay_on_site: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub car_id: Uuid,
    pub refund_percent: u8,
    pub refund_amount: f64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RentalCompletedEvent {
    pub booking_id: Uuid,
    pub car_id: Uuid,
    pub owner_id: String,
    pub owner_earnings: f64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct WithdrawalRequestedEvent {
    pub owner_id: String,
    pub amount: f64,
    pub remaining_balance: f64,
    pub timestamp: i64,
}
