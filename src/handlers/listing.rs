// src/handlers/listing.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::listing::{
        CreateListingRequest, ListingListParams, ListingResponse, UpdateListingRequest,
    },
    utils::{guard, jwt::Claims},
};

const LISTING_COLUMNS: &str = r#"
    l.id, l.seller_id, l.artist_name, l.concert_date, l.venue_name,
    l.section, l.seat_row, l.seat_number, l.price, l.quantity_available,
    l.description, l.is_available, l.created_at, l.updated_at,
    u.username AS seller_username,
    p.total_sales AS seller_total_sales,
    p.average_rating AS seller_average_rating,
    p.is_verified_seller AS seller_is_verified_seller
"#;

async fn fetch_listing_response(pool: &PgPool, listing_id: i64) -> Result<ListingResponse, AppError> {
    let query = format!(
        r#"
        SELECT {LISTING_COLUMNS}
        FROM listings l
        JOIN users u ON l.seller_id = u.id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE l.id = $1
        "#
    );

    sqlx::query_as::<_, ListingResponse>(&query)
        .bind(listing_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Listing not found".to_string()))
}

/// Create a new ticket listing for the current user.
pub async fn create_listing(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.concert_date <= chrono::Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Concert date must be in the future".to_string(),
        ));
    }

    if payload.price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price must be greater than 0".to_string(),
        ));
    }

    if payload.quantity_available <= 0 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let listing_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO listings
            (seller_id, artist_name, concert_date, venue_name,
             section, seat_row, seat_number, price, quantity_available, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(claims.user_id())
    .bind(&payload.artist_name)
    .bind(payload.concert_date)
    .bind(&payload.venue_name)
    .bind(&payload.section)
    .bind(&payload.seat_row)
    .bind(&payload.seat_number)
    .bind(payload.price)
    .bind(payload.quantity_available)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create listing: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let listing = fetch_listing_response(&pool, listing_id).await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// Browse listings with optional filters. Public.
pub async fn list_listings(
    State(pool): State<PgPool>,
    Query(params): Query<ListingListParams>,
) -> Result<impl IntoResponse, AppError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let artist_pattern = params.artist_name.map(|a| format!("%{}%", a));
    let venue_pattern = params.venue_name.map(|v| format!("%{}%", v));

    let query = format!(
        r#"
        SELECT {LISTING_COLUMNS}
        FROM listings l
        JOIN users u ON l.seller_id = u.id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE l.is_available = $1
          AND ($2::TEXT IS NULL OR l.artist_name ILIKE $2)
          AND ($3::TEXT IS NULL OR l.venue_name ILIKE $3)
          AND ($4::TEXT IS NULL OR l.section = $4)
          AND ($5::NUMERIC IS NULL OR l.price >= $5)
          AND ($6::NUMERIC IS NULL OR l.price <= $6)
          AND ($7::DATE IS NULL OR l.concert_date >= $7)
          AND ($8::DATE IS NULL OR l.concert_date <= $8)
          AND (NOT $9 OR p.is_verified_seller)
        ORDER BY l.concert_date ASC
        OFFSET $10 LIMIT $11
        "#
    );

    let listings = sqlx::query_as::<_, ListingResponse>(&query)
        .bind(params.is_available.unwrap_or(true))
        .bind(artist_pattern)
        .bind(venue_pattern)
        .bind(params.section)
        .bind(params.min_price)
        .bind(params.max_price)
        .bind(params.concert_date_from)
        .bind(params.concert_date_to)
        .bind(params.verified_seller_only.unwrap_or(false))
        .bind(skip)
        .bind(limit)
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list listings: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(listings))
}

/// Get a single listing with seller stats. Public.
pub async fn get_listing(
    State(pool): State<PgPool>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let listing = fetch_listing_response(&pool, listing_id).await?;
    Ok(Json(listing))
}

/// Update a listing. Only the seller may mutate it; price, quantity,
/// description and availability are the mutable fields.
pub async fn update_listing(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(listing_id): Path<i64>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Existence before ownership: a missing listing is 404 for everyone.
    let seller_id = sqlx::query_scalar::<_, i64>("SELECT seller_id FROM listings WHERE id = $1")
        .bind(listing_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Listing not found".to_string()))?;

    guard::ensure_listing_owner(seller_id, claims.user_id())?;

    if let Some(price) = payload.price {
        if price <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Price must be greater than 0".to_string(),
            ));
        }
    }

    if let Some(quantity) = payload.quantity_available {
        if quantity < 0 {
            return Err(AppError::BadRequest(
                "Quantity cannot be negative".to_string(),
            ));
        }
    }

    sqlx::query(
        r#"
        UPDATE listings
        SET price = COALESCE($2, price),
            quantity_available = COALESCE($3, quantity_available),
            description = COALESCE($4, description),
            is_available = COALESCE($5, is_available),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(listing_id)
    .bind(payload.price)
    .bind(payload.quantity_available)
    .bind(&payload.description)
    .bind(payload.is_available)
    .execute(&pool)
    .await?;

    let listing = fetch_listing_response(&pool, listing_id).await?;

    Ok(Json(listing))
}

/// Delete a listing. Only the seller may delete it; the listing's messages
/// and reviews go with it via storage-level cascade.
pub async fn delete_listing(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let seller_id = sqlx::query_scalar::<_, i64>("SELECT seller_id FROM listings WHERE id = $1")
        .bind(listing_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Listing not found".to_string()))?;

    guard::ensure_listing_owner(seller_id, claims.user_id())?;

    sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(listing_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete listing: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// List a seller's available listings, soonest concert first. Public.
pub async fn list_seller_listings(
    State(pool): State<PgPool>,
    Path(seller_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(seller_id)
        .fetch_optional(&pool)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound("Seller not found".to_string()));
    }

    let query = format!(
        r#"
        SELECT {LISTING_COLUMNS}
        FROM listings l
        JOIN users u ON l.seller_id = u.id
        JOIN user_profiles p ON p.user_id = u.id
        WHERE l.seller_id = $1 AND l.is_available = TRUE
        ORDER BY l.concert_date ASC
        "#
    );

    let listings = sqlx::query_as::<_, ListingResponse>(&query)
        .bind(seller_id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(listings))
}
