use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::context::AppContext;
use crate::db::roles::Role;
use crate::db::users::{self, User};
use crate::error::{AppError, AppResult};
use crate::routes::authz::require_role;
use crate::routes::extractors::CurrentUser;
use crate::routes::roles::RoleResponse;
use crate::utils::{validate_email, validate_password, validate_username};

// ============================================================================
// Schemas
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub roles: Vec<RoleResponse>,
}

impl UserResponse {
    fn from_parts(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            roles: roles.into_iter().map(RoleResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub fn validate_pagination(pagination: &Pagination) -> Result<(), AppError> {
    if pagination.skip < 0 {
        return Err(AppError::Validation("skip must be non-negative".to_string()));
    }
    if !(1..=1000).contains(&pagination.limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 1000".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /users
/// Open registration; duplicates are pre-checked before the insert.
pub async fn create_user(
    State(app_context): State<Arc<AppContext>>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = validate_email(&payload.email).map_err(AppError::Validation)?;
    validate_username(&payload.username).map_err(AppError::Validation)?;
    validate_password(&payload.password).map_err(AppError::Validation)?;

    if users::get_by_email(&app_context.db_pool, &email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User with email '{}' already exists",
            email
        )));
    }
    if users::get_by_username(&app_context.db_pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "User with username '{}' already exists",
            payload.username
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users::create(
        &app_context.db_pool,
        &email,
        &payload.username,
        &password_hash,
        payload.is_active,
    )
    .await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, Vec::new())),
    ))
}

/// GET /users (admin)
pub async fn get_users(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<UserListResponse>> {
    require_role(&current, &["admin"])?;
    validate_pagination(&pagination)?;

    let listed = users::list(&app_context.db_pool, pagination.skip, pagination.limit).await?;
    let total = users::count(&app_context.db_pool).await?;

    let mut responses = Vec::with_capacity(listed.len());
    for user in listed {
        let roles = users::roles_for_user(&app_context.db_pool, &user.id).await?;
        responses.push(UserResponse::from_parts(user, roles));
    }

    Ok(Json(UserListResponse {
        users: responses,
        total,
    }))
}

/// GET /users/me
pub async fn read_users_me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_parts(current.user, current.roles))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_role(&current, &["admin", "user"])?;

    let (user, roles) = users::get_with_roles(&app_context.db_pool, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

    Ok(Json(UserResponse::from_parts(user, roles)))
}

/// PUT /users/{user_id} (self or admin)
pub async fn update_user(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    if user_id != current.user.id {
        require_role(&current, &["admin"]).map_err(|_| {
            AppError::Forbidden("You do not have permission to update this user".to_string())
        })?;
    }

    let existing = users::get_by_id(&app_context.db_pool, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

    let email = match &payload.email {
        Some(email) => {
            let email = validate_email(email).map_err(AppError::Validation)?;
            if email != existing.email
                && users::get_by_email(&app_context.db_pool, &email)
                    .await?
                    .is_some()
            {
                return Err(AppError::Conflict(format!(
                    "User with email '{}' already exists",
                    email
                )));
            }
            email
        }
        None => existing.email.clone(),
    };

    let username = match &payload.username {
        Some(username) => {
            validate_username(username).map_err(AppError::Validation)?;
            if username != &existing.username
                && users::get_by_username(&app_context.db_pool, username)
                    .await?
                    .is_some()
            {
                return Err(AppError::Conflict(format!(
                    "User with username '{}' already exists",
                    username
                )));
            }
            username.clone()
        }
        None => existing.username.clone(),
    };

    // An empty password field means "leave unchanged", matching the
    // create/update schema split of the public API.
    let password_hash = match payload.password.as_deref() {
        Some(password) if !password.is_empty() => {
            validate_password(password).map_err(AppError::Validation)?;
            hash_password(password)?
        }
        _ => existing.password_hash.clone(),
    };

    let is_active = payload.is_active.unwrap_or(existing.is_active);

    let user = users::update(
        &app_context.db_pool,
        &user_id,
        &email,
        &username,
        &password_hash,
        is_active,
    )
    .await?;
    let roles = users::roles_for_user(&app_context.db_pool, &user_id).await?;

    tracing::info!(user_id = %user_id, "User updated");

    Ok(Json(UserResponse::from_parts(user, roles)))
}

/// DELETE /users/{user_id} (self or admin)
pub async fn delete_user(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if user_id != current.user.id {
        require_role(&current, &["admin"]).map_err(|_| {
            AppError::Forbidden("You do not have permission to delete this user".to_string())
        })?;
    }

    let deleted = users::delete(&app_context.db_pool, &user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "User with id '{}' not found",
            user_id
        )));
    }

    tracing::info!(user_id = %user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/{user_id}/roles/{role_id} (admin)
pub async fn assign_role_to_user(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<UserResponse>> {
    require_role(&current, &["admin"])?;

    let user = users::get_by_id(&app_context.db_pool, &user_id).await?;
    let role = crate::db::roles::get_by_id(&app_context.db_pool, &role_id).await?;
    let (Some(user), Some(_role)) = (user, role) else {
        return Err(AppError::NotFound(format!(
            "User with id '{}' or role with id '{}' not found",
            user_id, role_id
        )));
    };

    users::assign_role(&app_context.db_pool, &user_id, &role_id).await?;

    let roles = users::roles_for_user(&app_context.db_pool, &user_id).await?;

    tracing::info!(user_id = %user_id, role_id = %role_id, "Role assigned");

    Ok(Json(UserResponse::from_parts(user, roles)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_bounds_are_enforced() {
        assert!(validate_pagination(&Pagination { skip: 0, limit: 100 }).is_ok());
        assert!(validate_pagination(&Pagination { skip: -1, limit: 100 }).is_err());
        assert!(validate_pagination(&Pagination { skip: 0, limit: 0 }).is_err());
        assert!(validate_pagination(&Pagination { skip: 0, limit: 1001 }).is_err());
        assert!(validate_pagination(&Pagination { skip: 0, limit: 1000 }).is_ok());
    }
}
