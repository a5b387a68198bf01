use sqlx::Result;
use uuid::Uuid;

use super::DbPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

pub async fn create(pool: &DbPool, name: &str, description: Option<&str>) -> Result<Role> {
    sqlx::query_as::<_, Role>(
        r#"
        INSERT INTO roles (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn get_by_id(pool: &DbPool, role_id: &Uuid) -> Result<Option<Role>> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT id, name, description
        FROM roles
        WHERE id = $1
        "#,
    )
    .bind(role_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_name(pool: &DbPool, name: &str) -> Result<Option<Role>> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT id, name, description
        FROM roles
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &DbPool, skip: i64, limit: i64) -> Result<Vec<Role>> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT id, name, description
        FROM roles
        ORDER BY name
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &DbPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &DbPool,
    role_id: &Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Role> {
    sqlx::query_as::<_, Role>(
        r#"
        UPDATE roles
        SET name = $1, description = $2
        WHERE id = $3
        RETURNING id, name, description
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(role_id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &DbPool, role_id: &Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
