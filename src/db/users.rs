use sqlx::PgPool;

use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, hashed_password, created_at";

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    hashed_password: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(hashed_password)
    .fetch_one(pool)
    .await
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE name = $1",
        USER_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
}
