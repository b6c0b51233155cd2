// src/models/review.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'reviews' table in the database.
/// Append-only: a review is never edited after creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    pub reviewed_user_id: i64,

    /// The listing the review refers to, if any.
    pub listing_id: Option<i64>,

    /// 1-5 stars.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a review.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub listing_id: Option<i64>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,

    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// DTO for displaying a review with the reviewer's username joined in.
#[derive(Debug, Serialize, FromRow)]
pub struct ReviewResponse {
    pub id: i64,
    pub reviewer_id: i64,
    pub reviewer_username: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Query parameters for listing a user's reviews.
#[derive(Debug, Deserialize)]
pub struct ReviewListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
