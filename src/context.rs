use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::AuthManager;
use crate::config::Config;
use crate::db::DbPool;

/// Application context containing shared dependencies.
///
/// Built once at startup and handed to every handler through axum state;
/// nothing in here is mutated after construction. The HTTP client carries
/// the connection pool reused by all concurrent proxy requests.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db_pool: DbPool,
    pub auth_manager: Arc<AuthManager>,
    pub http_client: reqwest::Client,
}

impl AppContext {
    pub fn new(
        config: Arc<Config>,
        db_pool: DbPool,
        auth_manager: Arc<AuthManager>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.mapserver.request_timeout_secs))
            .build()
            .context("Failed to build MapServer HTTP client")?;

        Ok(Self {
            config,
            db_pool,
            auth_manager,
            http_client,
        })
    }
}
