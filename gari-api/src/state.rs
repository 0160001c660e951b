use gari_catalog::CarRepository;
use gari_core::identity::DriverProfile;
use gari_order::finance::FinancialManager;
use gari_order::repository::BookingRepository;
use gari_order::PaymentOrchestrator;
use gari_store::{EventProducer, RedisClient};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub booking_repo: Arc<dyn BookingRepository>,
    pub car_repo: Arc<dyn CarRepository>,
    pub redis: Arc<RedisClient>,
    pub kafka: Arc<EventProducer>,
    pub payments: Arc<PaymentOrchestrator>,
    pub finance: Arc<RwLock<FinancialManager>>,
    pub profiles: Arc<RwLock<HashMap<String, DriverProfile>>>,
    pub auth: AuthConfig,
    pub business_rules: gari_store::app_config::BusinessRules,
}
