use sqlx::Result;
use uuid::Uuid;

use super::roles::Role;
use super::DbPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

pub async fn create(
    pool: &DbPool,
    email: &str,
    username: &str,
    password_hash: &str,
    is_active: bool,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password_hash, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, username, password_hash, is_active
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(is_active)
    .fetch_one(pool)
    .await
}

pub async fn get_by_id(pool: &DbPool, user_id: &Uuid) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, is_active
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, is_active
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, is_active
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &DbPool, skip: i64, limit: i64) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, is_active
        FROM users
        ORDER BY username
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &DbPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &DbPool,
    user_id: &Uuid,
    email: &str,
    username: &str,
    password_hash: &str,
    is_active: bool,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = $1, username = $2, password_hash = $3, is_active = $4
        WHERE id = $5
        RETURNING id, email, username, password_hash, is_active
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(is_active)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &DbPool, user_id: &Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Role membership (explicit join-table access, no ORM back-references)
// ============================================================================

pub async fn roles_for_user(pool: &DbPool, user_id: &Uuid) -> Result<Vec<Role>> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT r.id, r.name, r.description
        FROM roles r
        JOIN user_role_association ura ON ura.role_id = r.id
        WHERE ura.user_id = $1
        ORDER BY r.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Links a role to a user. Assigning an already-held role is a no-op.
pub async fn assign_role(pool: &DbPool, user_id: &Uuid, role_id: &Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_role_association (user_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, role_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetches a user together with their roles, or None if the user is gone.
pub async fn get_with_roles(pool: &DbPool, user_id: &Uuid) -> Result<Option<(User, Vec<Role>)>> {
    let Some(user) = get_by_id(pool, user_id).await? else {
        return Ok(None);
    };
    let roles = roles_for_user(pool, user_id).await?;
    Ok(Some((user, roles)))
}
