pub mod availability;
pub mod car;
pub mod media;
pub mod repository;

pub use availability::{AvailabilityCalendar, DateRange};
pub use car::{Car, FuelType, Transmission};
pub use repository::{CarRepository, InMemoryCarRepository};
