use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

/// The knobs the commercial side tunes without a deploy. Defaults mirror
/// the launch-market policy (Kenya: 16% VAT, 15% commission).
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub commission_rate: f64,
    pub vat_rate: f64,
    pub insurance_per_day: f64,
    pub cross_country_per_day: f64,
    pub min_rental_days: i64,
    pub min_driver_age: i32,
    /// Strictly more hours than this before pickup: full booking-fee refund
    pub full_refund_hours: i64,
    /// At least this many hours before pickup: half refund
    pub half_refund_hours: i64,
    /// TTL of the Redis checkout hold taken while a booking is created
    pub checkout_hold_seconds: u64,
    #[serde(default = "default_wallet_balance")]
    pub starting_wallet_balance: f64,
}

fn default_wallet_balance() -> f64 {
    50_000.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string; empty selects the in-memory store
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of GARI)
            // Eg.. `GARI__SERVER__PORT=9090` would set the server port
            .add_source(config::Environment::with_prefix("GARI").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl BusinessRules {
    pub fn pricing_config(&self) -> gari_quote::PricingConfig {
        gari_quote::PricingConfig {
            commission_rate: self.commission_rate,
            vat_rate: self.vat_rate,
            insurance_per_day: self.insurance_per_day,
            cross_country_per_day: self.cross_country_per_day,
        }
    }

    pub fn booking_rules(&self) -> gari_quote::BookingRules {
        gari_quote::BookingRules {
            min_rental_days: self.min_rental_days,
            min_driver_age: self.min_driver_age,
        }
    }

    pub fn refund_policy(&self) -> gari_quote::RefundPolicy {
        gari_quote::RefundPolicy {
            full_refund_hours: self.full_refund_hours,
            half_refund_hours: self.half_refund_hours,
        }
    }
}
