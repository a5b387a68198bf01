use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::context::AppContext;
use crate::db::roles::Role;
use crate::db::users::{self, User};
use crate::error::AppError;

/// The authenticated principal, resolved once per request.
///
/// Usage:
/// ```ignore
/// async fn handler(current: CurrentUser, ...) -> AppResult<...> {
///     let user_id = current.user.id;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Pulls the bearer token out of the request: `Authorization: Bearer <t>`
/// first, then the named cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some((scheme, token)) = value.split_once(' ') {
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookies) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        for cookie in cookies.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie.strip_prefix(&format!("{}=", cookie_name)) {
                return Some(value.to_string());
            }
        }
    }

    None
}

fn credentials_rejection() -> AppError {
    AppError::Unauthenticated("Could not validate credentials".to_string())
}

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = AppError;

    /// Terminal outcomes only: extract, validate, resolve. Every failure
    /// branch collapses into the same 401 with a bearer challenge.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, &state.config.auth.cookie_name)
            .ok_or_else(credentials_rejection)?;

        let claims = state.auth_manager.verify_token(&token).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            credentials_rejection()
        })?;

        // The active flag is intentionally not re-checked here: a deactivated
        // user keeps access until the token expires.
        let (user, roles) = users::get_with_roles(&state.db_pool, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
                credentials_rejection()
            })?;

        Ok(CurrentUser { user, roles })
    }
}
