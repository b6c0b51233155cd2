// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address, used for login.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    /// Whether the user has verified their email address.
    pub is_verified: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'user_profiles' table.
/// Every user owns exactly one profile; `average_rating` and
/// `is_verified_seller` are derived from received reviews.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub total_sales: i32,
    pub average_rating: f64,
    pub is_verified_seller: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new user (Signup).
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for updating the current user's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 500, message = "Bio must be at most 500 characters."))]
    pub bio: Option<String>,

    #[validate(length(max = 500))]
    pub profile_picture_url: Option<String>,
}

/// Public profile view: no email, no private info.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicProfile {
    pub id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub total_sales: i32,
    pub average_rating: f64,
    pub is_verified_seller: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Full profile view for the account owner, including email.
#[derive(Debug, Serialize, FromRow)]
pub struct PrivateProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub total_sales: i32,
    pub average_rating: f64,
    pub is_verified_seller: bool,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Query parameters for user search.
#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    /// Case-insensitive username substring.
    pub q: String,

    /// Only return verified sellers.
    pub verified_only: Option<bool>,

    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
