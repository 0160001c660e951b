pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod memory_repo;
pub mod redis_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use events::EventProducer;
pub use memory_repo::InMemoryBookingRepository;
pub use redis_repo::RedisClient;
