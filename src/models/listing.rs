// src/models/listing.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'listings' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub seller_id: i64,

    pub artist_name: String,
    pub concert_date: chrono::NaiveDate,
    pub venue_name: String,

    pub section: Option<String>,
    pub seat_row: Option<String>,
    pub seat_number: Option<String>,

    pub price: Decimal,
    pub quantity_available: i32,

    pub description: Option<String>,
    pub is_available: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Listing with seller stats joined in, as returned by the API.
#[derive(Debug, Serialize, FromRow)]
pub struct ListingResponse {
    pub id: i64,
    pub seller_id: i64,
    pub artist_name: String,
    pub concert_date: chrono::NaiveDate,
    pub venue_name: String,
    pub section: Option<String>,
    pub seat_row: Option<String>,
    pub seat_number: Option<String>,
    pub price: Decimal,
    pub quantity_available: i32,
    pub description: Option<String>,
    pub is_available: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    pub seller_username: String,
    pub seller_total_sales: i32,
    pub seller_average_rating: f64,
    pub seller_is_verified_seller: bool,
}

fn default_quantity() -> i32 {
    1
}

/// DTO for creating a new listing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 200, message = "Artist name is required."))]
    pub artist_name: String,

    pub concert_date: chrono::NaiveDate,

    #[validate(length(min = 1, max = 200, message = "Venue name is required."))]
    pub venue_name: String,

    #[validate(length(max = 50))]
    pub section: Option<String>,
    #[validate(length(max = 10))]
    pub seat_row: Option<String>,
    #[validate(length(max = 10))]
    pub seat_number: Option<String>,

    pub price: Decimal,

    #[serde(default = "default_quantity")]
    pub quantity_available: i32,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// DTO for updating a listing. Only the fields below are mutable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    pub price: Option<Decimal>,
    pub quantity_available: Option<i32>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

/// Query parameters for browsing listings.
#[derive(Debug, Deserialize)]
pub struct ListingListParams {
    /// Case-insensitive artist substring.
    pub artist_name: Option<String>,
    /// Case-insensitive venue substring.
    pub venue_name: Option<String>,
    pub section: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub concert_date_from: Option<chrono::NaiveDate>,
    pub concert_date_to: Option<chrono::NaiveDate>,
    pub verified_seller_only: Option<bool>,
    pub is_available: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
