// tests/api_tests.rs

use resale_backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // Note: For Postgres, you must have a running database.
    // We'll read from DATABASE_URL environment variable.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
    };

    let state = AppState { pool, config };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn unique_username() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn signup_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();

    // Act
    let response = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], username.as_str());
    // The password hash must never appear in a response.
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn signup_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": "yo",
            "email": "yo@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    // Invalid email
    let username = unique_username();
    let response = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn signup_duplicate_username_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();

    let first = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    // Same username, different email
    let second = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}_other@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);

    // Same email, different username
    let third = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": unique_username(),
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(third.status().as_u16(), 409);
}

#[tokio::test]
async fn login_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();
    let email = format!("{}@example.com", username);

    client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], username.as_str());
}

#[tokio::test]
async fn login_wrong_password_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();
    let email = format!("{}@example.com", username);

    client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn me_requires_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/auth/me", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn me_returns_current_user() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();

    let signup: serde_json::Value = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let token = signup["token"].as_str().unwrap();

    let response = client
        .get(&format!("{}/api/auth/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
}

#[tokio::test]
async fn signup_creates_profile_atomically() {
    // A fresh user must immediately have a readable profile with zeroed
    // reputation fields.
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_username();

    let signup: serde_json::Value = client
        .post(&format!("{}/api/auth/signup", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let user_id = signup["user"]["id"].as_i64().unwrap();

    let profile: serde_json::Value = client
        .get(&format!("{}/api/users/{}", address, user_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(profile["username"], username.as_str());
    assert_eq!(profile["average_rating"].as_f64().unwrap(), 0.0);
    assert_eq!(profile["is_verified_seller"], false);
    assert_eq!(profile["total_sales"], 0);
    // Public view never exposes the email.
    assert!(profile.get("email").is_none());
}
