// src/models/seller_proof.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'seller_proof' table: evidence of past sales a seller
/// attaches to their own account. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SellerProof {
    pub id: i64,
    pub seller_id: i64,
    pub proof_image_url: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for uploading seller proof.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSellerProofRequest {
    #[validate(length(min = 1, max = 500, message = "Proof image URL is required."))]
    pub proof_image_url: String,

    #[validate(length(max = 255))]
    pub description: Option<String>,
}
