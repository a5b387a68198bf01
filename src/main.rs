use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use geoportal_server::auth::AuthManager;
use geoportal_server::config::Config;
use geoportal_server::context::AppContext;
use geoportal_server::{db, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(config);

    let db_pool = db::create_pool(&config.db).await?;
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!(db = %config.db.name, "Connected to database");

    let auth_manager = Arc::new(AuthManager::new(&config.auth)?);
    let app_context = Arc::new(AppContext::new(config.clone(), db_pool, auth_manager)?);

    let app = routes::create_router(app_context);

    let addr = format!("{}:{}", config.app.host, config.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        %addr,
        env = %config.app.env.as_str(),
        "{} v{} listening",
        config.app.name,
        config.app.version
    );

    axum::serve(listener, app).await?;

    Ok(())
}
