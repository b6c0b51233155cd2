// src/handlers/review.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::{
    config::{VERIFIED_SELLER_MIN_RATING, VERIFIED_SELLER_MIN_REVIEWS},
    error::AppError,
    models::review::{CreateReviewRequest, Review, ReviewListParams, ReviewResponse},
    utils::{guard, jwt::Claims},
};

/// Whether a seller's verification flag should be set after a recomputation.
/// The flag is a one-way latch: once true it stays true, even if later
/// reviews drag the average back below the threshold.
fn latched_verification(currently_verified: bool, review_count: i64, average_rating: f64) -> bool {
    currently_verified
        || (review_count >= VERIFIED_SELLER_MIN_REVIEWS
            && average_rating >= VERIFIED_SELLER_MIN_RATING)
}

/// Recompute a user's reputation from the full review set and persist it.
///
/// Runs inside the caller's transaction with the profile row locked, so two
/// concurrent review submissions serialize here instead of both writing a
/// stale average.
pub async fn recompute_reputation(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
) -> Result<(), AppError> {
    let currently_verified = sqlx::query_scalar::<_, bool>(
        "SELECT is_verified_seller FROM user_profiles WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    let (review_count, average_rating) = sqlx::query_as::<_, (i64, Option<f64>)>(
        r#"
        SELECT COUNT(*), AVG(rating)::DOUBLE PRECISION
        FROM reviews
        WHERE reviewed_user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    let average_rating = average_rating.unwrap_or(0.0);
    let is_verified_seller = latched_verification(currently_verified, review_count, average_rating);

    sqlx::query(
        r#"
        UPDATE user_profiles
        SET average_rating = $2,
            is_verified_seller = $3,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(average_rating)
    .bind(is_verified_seller)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Leave a review for a seller.
///
/// The review insert and the seller's reputation recomputation commit
/// together; a request never observes a review without its effect on the
/// seller's average.
pub async fn create_review(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(user_id): Path<i64>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let reviewer_id = claims.user_id();
    guard::reject_self_target(reviewer_id, user_id, "review")?;

    let mut tx = pool.begin().await?;

    let reviewed_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

    if reviewed_exists.is_none() {
        return Err(AppError::NotFound("Seller not found".to_string()));
    }

    if let Some(listing_id) = payload.listing_id {
        let listing_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&mut *tx)
            .await?;

        if listing_exists.is_none() {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }
    }

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (reviewer_id, reviewed_user_id, listing_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, reviewer_id, reviewed_user_id, listing_id, rating, comment, created_at
        "#,
    )
    .bind(reviewer_id)
    .bind(user_id)
    .bind(payload.listing_id)
    .bind(payload.rating)
    .bind(&payload.comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create review: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    recompute_reputation(&mut tx, user_id).await?;

    let reviewer_username = sqlx::query_scalar::<_, String>(
        "SELECT username FROM users WHERE id = $1",
    )
    .bind(reviewer_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            id: review.id,
            reviewer_id: review.reviewer_id,
            reviewer_username,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }),
    ))
}

/// List all reviews received by a user, newest first. Public.
pub async fn list_user_reviews(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
    Query(params): Query<ReviewListParams>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(10).clamp(1, 50);

    let reviews = sqlx::query_as::<_, ReviewResponse>(
        r#"
        SELECT
            r.id, r.reviewer_id, u.username AS reviewer_username,
            r.rating, r.comment, r.created_at
        FROM reviews r
        JOIN users u ON r.reviewer_id = u.id
        WHERE r.reviewed_user_id = $1
        ORDER BY r.created_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(reviews))
}
