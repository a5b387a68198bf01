// Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use geoportal_server::auth::AuthManager;
use geoportal_server::config::{
    AppConfig, AppEnv, AuthConfig, Config, DbConfig, MapServerConfig,
};
use geoportal_server::context::AppContext;
use geoportal_server::routes;

pub fn test_config(mapserver_url: &str) -> Config {
    Config {
        app: AppConfig {
            env: AppEnv::Test,
            name: "Geoportal API".to_string(),
            version: "0.1.0".to_string(),
            api_prefix: "/api/v1".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        db: DbConfig {
            user: "user".to_string(),
            password: "password".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            name: "geoportaldb_test".to_string(),
            max_connections: 2,
            acquire_timeout_secs: 5,
        },
        auth: AuthConfig {
            secret_key: "integration-test-secret".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            cookie_delivery: true,
            cookie_name: "access_token".to_string(),
            cookie_secure: false,
        },
        mapserver: MapServerConfig {
            url: mapserver_url.to_string(),
            request_timeout_secs: 5,
        },
        rust_log: "warn".to_string(),
    }
}

/// Spawns the application on an ephemeral port and returns its address.
///
/// The database pool is created lazily, so routes that never touch the
/// database (proxy forwarding, rejected auth) work without a running
/// Postgres instance.
pub async fn spawn_app(config: Config) -> SocketAddr {
    let config = Arc::new(config);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect_lazy(&config.db.database_url())
        .expect("failed to build lazy pool");

    let auth_manager = Arc::new(AuthManager::new(&config.auth).expect("failed to build auth manager"));
    let app_context =
        Arc::new(AppContext::new(config, db_pool, auth_manager).expect("failed to build context"));

    let app = routes::create_router(app_context);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server died");
    });

    addr
}
