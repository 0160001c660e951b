use gari_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use gari_catalog::InMemoryCarRepository;
use gari_order::repository::BookingRepository;
use gari_order::{FinancialManager, MockGatewayAdapter, PaymentOrchestrator};
use gari_store::{InMemoryBookingRepository, PgBookingRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gari_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = gari_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Gari API on port {}", config.server.port);

    // Booking storage: Postgres when configured, the in-process store
    // otherwise (bookings then live for the lifetime of the process)
    let booking_repo: Arc<dyn BookingRepository> = if config.database.url.is_empty() {
        tracing::warn!("No database configured, using the in-memory booking store");
        Arc::new(InMemoryBookingRepository::new())
    } else {
        let db = gari_store::DbClient::new(&config.database.url)
            .await
            .expect("Failed to connect to Postgres");
        db.migrate().await.expect("Failed to run migrations");
        Arc::new(PgBookingRepository::new(db.pool.clone()))
    };

    // Redis Connection
    let redis_client = gari_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    // Kafka Connection
    let kafka_producer = gari_store::EventProducer::new(&config.kafka.brokers)
        .expect("Failed to create Kafka producer");

    let payments = Arc::new(PaymentOrchestrator::new(
        Arc::new(MockGatewayAdapter::new()),
        config.business_rules.starting_wallet_balance,
    ));
    let finance = Arc::new(tokio::sync::RwLock::new(FinancialManager::new()));
    let kafka_arc = Arc::new(kafka_producer);

    let app_state = AppState {
        booking_repo: booking_repo.clone(),
        car_repo: Arc::new(InMemoryCarRepository::seeded()),
        redis: Arc::new(redis_client),
        kafka: kafka_arc.clone(),
        payments,
        finance: finance.clone(),
        profiles: Arc::new(tokio::sync::RwLock::new(std::collections::HashMap::new())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    // Rental lifecycle worker (countdown sweeps)
    tokio::spawn(worker::start_lifecycle_worker(
        booking_repo,
        finance,
        kafka_arc,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
