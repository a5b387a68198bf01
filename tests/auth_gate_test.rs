// End-to-end tests for the authentication gate and the public endpoints.
// Everything here fails before the database is touched, so no Postgres is
// needed.

mod test_utils;

use axum::http::StatusCode;

use geoportal_server::auth::AuthManager;
use test_utils::{spawn_app, test_config};

#[tokio::test]
async fn missing_token_is_rejected_with_challenge() {
    let app = spawn_app(test_config("http://localhost:9")).await;

    let response = reqwest::get(format!("http://{}/api/v1/users/me", app))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "Bearer");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not validate credentials");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = spawn_app(test_config("http://localhost:9")).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/v1/users/me", app))
        .header("authorization", "Bearer not.a.token")
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "Bearer");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let config = test_config("http://localhost:9");

    // Same secret as the app, but a TTL in the past.
    let mut expired_auth = config.auth.clone();
    expired_auth.access_token_expire_minutes = -5;
    let issuer = AuthManager::new(&expired_auth).unwrap();
    let token = issuer
        .create_access_token(&uuid::Uuid::new_v4())
        .unwrap();

    let app = spawn_app(config).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/v1/users/me", app))
        .header("authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_token_is_accepted_as_fallback() {
    // An invalid cookie token must take the same rejection path as an
    // invalid header token: the gate reads it, validation fails, 401.
    let app = spawn_app(test_config("http://localhost:9")).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/v1/users/me", app))
        .header("cookie", "access_token=not.a.token")
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "Bearer");
}

#[tokio::test]
async fn health_check_is_public() {
    let app = spawn_app(test_config("http://localhost:9")).await;

    let response = reqwest::get(format!("http://{}/api/v1/health", app))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn root_reports_name_and_version() {
    let app = spawn_app(test_config("http://localhost:9")).await;

    let response = reqwest::get(format!("http://{}/", app))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Welcome to Geoportal API v0.1.0");
}
