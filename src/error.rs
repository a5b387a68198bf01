use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Component-internal failures (hash mismatch, signature failure, parse
/// failure) are collapsed into these coarse categories before they reach a
/// client; the detail is logged, never surfaced.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Authentication & Authorization =====
    /// Bad username/password at login.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Missing, invalid or expired token, or token subject not resolvable.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but lacking the required role or ownership.
    #[error("forbidden: {0}")]
    Forbidden(String),

    // ===== Data access =====
    /// Duplicate unique field on create/update.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // ===== MapServer proxy =====
    /// Transport-level failure reaching the upstream (refused, DNS, timeout).
    #[error("upstream unreachable")]
    UpstreamUnreachable,

    /// Any other failure on the forwarding path.
    #[error("unexpected proxy failure")]
    UpstreamUnexpected,

    // ===== Internal =====
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials(_) | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnexpected => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message, free of internal detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidCredentials(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::UpstreamUnreachable => "Error connecting to MapServer".to_string(),
            AppError::UpstreamUnexpected => {
                "An unexpected error occurred while proxying the request".to_string()
            }
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::Unknown(_) => "Internal server error".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UpstreamUnreachable => "UPSTREAM_UNREACHABLE",
            AppError::UpstreamUnexpected => "UPSTREAM_UNEXPECTED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// True for the two 401 categories that must carry a challenge header.
    fn is_challenge(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials(_) | AppError::Unauthenticated(_)
        )
    }

    /// The proxy failure paths answer in plain text, not JSON.
    fn is_plain_text(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnreachable | AppError::UpstreamUnexpected
        )
    }

    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, error_code = %code, "Server error occurred");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error = %self, error_code = %code, "Authentication failed");
        } else {
            tracing::debug!(error = %self, error_code = %code, "Client error occurred");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();

        if self.is_plain_text() {
            return (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.user_message(),
            )
                .into_response();
        }

        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        let mut response = (status, axum::Json(body)).into_response();
        if self.is_challenge() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AppError::InvalidCredentials("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UpstreamUnreachable.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::UpstreamUnexpected.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_responses_carry_a_bearer_challenge() {
        let response = AppError::Unauthenticated("Could not validate credentials".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = AppError::InvalidCredentials("Incorrect username or password".into())
            .into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn forbidden_responses_do_not_challenge() {
        let response = AppError::Forbidden("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn proxy_failures_answer_in_plain_text() {
        let response = AppError::UpstreamUnreachable.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = AppError::Unknown(anyhow::anyhow!("secret connection string"));
        assert_eq!(err.user_message(), "Internal server error");
    }
}
