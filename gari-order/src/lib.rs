pub mod finance;
pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod store;
pub mod tracking;

pub use finance::{CommissionSplit, FinanceError, FinancialManager, LedgerEntry, OwnerAccount};
pub use models::{Booking, BookingDraft, BookingStatus, BookingUpdate};
pub use orchestrator::{MockGatewayAdapter, PaymentError, PaymentOrchestrator};
pub use repository::BookingRepository;
pub use store::{BookingStore, StoreError};
pub use tracking::{time_remaining, Countdown};
