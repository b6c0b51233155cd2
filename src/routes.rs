// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, listing, message, profile, review},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, listings, messages).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
///
/// Authentication is enforced per-handler through the `Claims` extractor;
/// handlers without it are public reads.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let user_routes = Router::new()
        .route("/search", get(profile::search_users))
        .route("/me", put(profile::update_my_profile))
        .route("/me/profile", get(profile::get_my_profile))
        .route("/me/proof", post(profile::upload_seller_proof))
        .route("/{user_id}", get(profile::get_public_profile))
        .route(
            "/{user_id}/reviews",
            get(review::list_user_reviews).post(review::create_review),
        )
        .route("/{user_id}/proof", get(profile::list_seller_proof));

    let listing_routes = Router::new()
        .route(
            "/",
            get(listing::list_listings).post(listing::create_listing),
        )
        .route(
            "/{listing_id}",
            get(listing::get_listing)
                .put(listing::update_listing)
                .delete(listing::delete_listing),
        )
        .route("/seller/{seller_id}", get(listing::list_seller_listings));

    let message_routes = Router::new()
        .route("/", post(message::send_message).get(message::list_messages))
        .route("/conversations/list", get(message::list_conversations))
        .route("/conversation/{user_id}", get(message::get_conversation))
        .route("/stats/unread-count", get(message::unread_count))
        .route(
            "/{message_id}",
            get(message::get_message).delete(message::delete_message),
        )
        .route("/{message_id}/read", put(message::mark_read));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/listings", listing_routes)
        .nest("/api/messages", message_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
