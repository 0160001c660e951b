pub mod currency;
pub mod models;
pub mod pii;
