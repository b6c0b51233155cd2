// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Minimum number of received reviews before a seller can be auto-verified.
pub const VERIFIED_SELLER_MIN_REVIEWS: i64 = 5;

/// Minimum average rating required for auto-verification.
pub const VERIFIED_SELLER_MIN_RATING: f64 = 4.5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        // Token lifetime in seconds. 30 minutes unless overridden.
        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1800);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
        }
    }
}
