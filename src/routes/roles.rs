use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::db::roles::{self, Role};
use crate::error::{AppError, AppResult};
use crate::routes::authz::require_role;
use crate::routes::extractors::CurrentUser;
use crate::routes::users::{validate_pagination, Pagination};
use crate::utils::{validate_role_description, validate_role_name};

// All role management is admin-only.

#[derive(Debug, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<RoleResponse>,
    pub total: i64,
}

fn validate_role_payload(name: Option<&str>, description: Option<&str>) -> Result<(), AppError> {
    if let Some(name) = name {
        validate_role_name(name).map_err(AppError::Validation)?;
    }
    if let Some(description) = description {
        validate_role_description(description).map_err(AppError::Validation)?;
    }
    Ok(())
}

/// POST /roles
pub async fn create_role(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Json(payload): Json<RoleCreate>,
) -> AppResult<(StatusCode, Json<RoleResponse>)> {
    require_role(&current, &["admin"])?;
    validate_role_payload(Some(&payload.name), payload.description.as_deref())?;

    if roles::get_by_name(&app_context.db_pool, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Role with name '{}' already exists",
            payload.name
        )));
    }

    let role = roles::create(
        &app_context.db_pool,
        &payload.name,
        payload.description.as_deref(),
    )
    .await?;

    tracing::info!(role_id = %role.id, name = %role.name, "Role created");

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

/// GET /roles
pub async fn get_roles(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<RoleListResponse>> {
    require_role(&current, &["admin"])?;
    validate_pagination(&pagination)?;

    let listed = roles::list(&app_context.db_pool, pagination.skip, pagination.limit).await?;
    let total = roles::count(&app_context.db_pool).await?;

    Ok(Json(RoleListResponse {
        roles: listed.into_iter().map(RoleResponse::from).collect(),
        total,
    }))
}

/// GET /roles/{role_id}
pub async fn get_role(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<RoleResponse>> {
    require_role(&current, &["admin"])?;

    let role = roles::get_by_id(&app_context.db_pool, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role with id '{}' not found", role_id)))?;

    Ok(Json(RoleResponse::from(role)))
}

/// PUT /roles/{role_id}
pub async fn update_role(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<RoleResponse>> {
    require_role(&current, &["admin"])?;
    validate_role_payload(payload.name.as_deref(), payload.description.as_deref())?;

    let existing = roles::get_by_id(&app_context.db_pool, &role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role with id '{}' not found", role_id)))?;

    let name = match &payload.name {
        Some(name) => {
            if name != &existing.name
                && roles::get_by_name(&app_context.db_pool, name)
                    .await?
                    .is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Role with name '{}' already exists",
                    name
                )));
            }
            name.clone()
        }
        None => existing.name.clone(),
    };

    let description = payload
        .description
        .clone()
        .or_else(|| existing.description.clone());

    let role = roles::update(
        &app_context.db_pool,
        &role_id,
        &name,
        description.as_deref(),
    )
    .await?;

    tracing::info!(role_id = %role_id, "Role updated");

    Ok(Json(RoleResponse::from(role)))
}

/// DELETE /roles/{role_id}
pub async fn delete_role(
    State(app_context): State<Arc<AppContext>>,
    current: CurrentUser,
    Path(role_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_role(&current, &["admin"])?;

    let deleted = roles::delete(&app_context.db_pool, &role_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "Role with id '{}' not found",
            role_id
        )));
    }

    tracing::info!(role_id = %role_id, "Role deleted");

    Ok(StatusCode::NO_CONTENT)
}
