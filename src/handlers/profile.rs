// src/handlers/profile.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        seller_proof::{CreateSellerProofRequest, SellerProof},
        user::{PrivateProfile, PublicProfile, UpdateProfileRequest, UserSearchParams},
    },
    utils::jwt::Claims,
};

/// Get the public profile of a user: reputation stats, no email.
pub async fn get_public_profile(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let profile = sqlx::query_as::<_, PublicProfile>(
        r#"
        SELECT
            u.id, u.username, p.bio, p.profile_picture_url,
            p.total_sales, p.average_rating, p.is_verified_seller,
            u.created_at
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

/// Get the current user's full profile, including email and verification flag.
pub async fn get_my_profile(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let profile = sqlx::query_as::<_, PrivateProfile>(
        r#"
        SELECT
            u.id, u.username, u.email, p.bio, p.profile_picture_url,
            p.total_sales, p.average_rating, p.is_verified_seller,
            u.is_verified, u.created_at
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Update the current user's bio and/or profile picture.
/// Derived reputation fields are not writable here.
pub async fn update_my_profile(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id();

    let updated = sqlx::query(
        r#"
        UPDATE user_profiles
        SET bio = COALESCE($2, bio),
            profile_picture_url = COALESCE($3, profile_picture_url),
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&payload.bio)
    .bind(&payload.profile_picture_url)
    .execute(&pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    let profile = sqlx::query_as::<_, PrivateProfile>(
        r#"
        SELECT
            u.id, u.username, u.email, p.bio, p.profile_picture_url,
            p.total_sales, p.average_rating, p.is_verified_seller,
            u.is_verified, u.created_at
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(profile))
}

/// Upload proof of a past sale for the current user.
pub async fn upload_seller_proof(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<CreateSellerProofRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let proof = sqlx::query_as::<_, SellerProof>(
        r#"
        INSERT INTO seller_proof (seller_id, proof_image_url, description)
        VALUES ($1, $2, $3)
        RETURNING id, seller_id, proof_image_url, description, created_at
        "#,
    )
    .bind(claims.user_id())
    .bind(&payload.proof_image_url)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upload seller proof: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(proof)))
}

/// List a seller's proof entries, newest first. Public.
pub async fn list_seller_proof(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let proofs = sqlx::query_as::<_, SellerProof>(
        r#"
        SELECT id, seller_id, proof_image_url, description, created_at
        FROM seller_proof
        WHERE seller_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(proofs))
}

/// Search users by username substring (case-insensitive).
/// Optionally restricted to verified sellers.
pub async fn search_users(
    State(pool): State<PgPool>,
    Query(params): Query<UserSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::BadRequest("Search query cannot be empty".to_string()));
    }

    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let pattern = format!("%{}%", params.q);
    let verified_only = params.verified_only.unwrap_or(false);

    let users = sqlx::query_as::<_, PublicProfile>(
        r#"
        SELECT
            u.id, u.username, p.bio, p.profile_picture_url,
            p.total_sales, p.average_rating, p.is_verified_seller,
            u.created_at
        FROM users u
        JOIN user_profiles p ON p.user_id = u.id
        WHERE u.username ILIKE $1
          AND (NOT $2 OR p.is_verified_seller)
        ORDER BY u.username ASC
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(&pattern)
    .bind(verified_only)
    .bind(skip)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(users))
}
