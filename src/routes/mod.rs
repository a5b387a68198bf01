// ============================================================================
// HTTP Routes
// ============================================================================
//
// Structure:
// - mod.rs: router assembly and middleware stack
// - auth.rs: login / token issuance
// - users.rs, roles.rs: user and role management
// - proxy.rs: MapServer reverse proxy (streaming passthrough)
// - health.rs: health check
// - extractors.rs: CurrentUser extractor (bearer header, cookie fallback)
// - authz.rs: role gate for protected routes
// - middleware.rs: request logging
//
// ============================================================================

pub mod auth;
pub mod authz;
pub mod extractors;
pub mod health;
pub mod middleware;
pub mod proxy;
pub mod roles;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Creates the application router with all routes mounted under the
/// configured API prefix.
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    let api = Router::new()
        // Authentication
        .route("/auth/token", post(auth::login_for_access_token))
        // Health
        .route("/health", get(health::health_check))
        // MapServer proxy (GET only; bypasses authentication)
        .route("/proxy/mapserver/*path", get(proxy::proxy_mapserver_get))
        // Users
        .route("/users", post(users::create_user).get(users::get_users))
        .route("/users/me", get(users::read_users_me))
        .route(
            "/users/:user_id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:user_id/roles/:role_id",
            post(users::assign_role_to_user),
        )
        // Roles
        .route("/roles", post(roles::create_role).get(roles::get_roles))
        .route(
            "/roles/:role_id",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        );

    Router::new()
        .route("/", get(root))
        .nest(&app_context.config.app.api_prefix, api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(app_context)
}

/// GET /
async fn root(State(app_context): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!(
            "Welcome to {} v{}",
            app_context.config.app.name, app_context.config.app.version
        )
    }))
}
