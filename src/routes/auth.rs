use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::verify_password;
use crate::context::AppContext;
use crate::db::users;
use crate::error::AppError;

/// OAuth2-style password grant form (`username` + `password`).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /auth/token
///
/// Returns the token in the response body and, when cookie delivery is
/// enabled, also sets it as an HTTP-only cookie. Unknown user and wrong
/// password produce the same response.
pub async fn login_for_access_token(
    State(app_context): State<Arc<AppContext>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get_by_username(&app_context.db_pool, &form.username).await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Login failed");
            return Err(AppError::InvalidCredentials(
                "Incorrect username or password".to_string(),
            ));
        }
    };

    let access_token = app_context
        .auth_manager
        .create_access_token(&user.id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create access token");
            AppError::Unknown(e)
        })?;

    tracing::info!(user_id = %user.id, "User logged in");

    let mut response = Json(TokenResponse {
        access_token: access_token.clone(),
        token_type: "bearer".to_string(),
    })
    .into_response();

    if app_context.config.auth.cookie_delivery {
        let cookie = build_access_cookie(
            &app_context.config.auth.cookie_name,
            &access_token,
            app_context.config.auth.cookie_secure,
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }

    Ok(response)
}

fn build_access_cookie(name: &str, token: &str, secure: bool) -> String {
    let mut cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", name, token);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_carries_security_attributes() {
        let cookie = build_access_cookie("access_token", "tok123", false);
        assert_eq!(cookie, "access_token=tok123; HttpOnly; SameSite=Lax; Path=/");

        let cookie = build_access_cookie("access_token", "tok123", true);
        assert!(cookie.ends_with("; Secure"));
    }
}
