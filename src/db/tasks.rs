//! Task statements. Every query is scoped by the owning user's id.

use sqlx::{PgExecutor, PgPool};

use crate::config::TaskListParams;
use crate::models::Task;

const TASK_COLUMNS: &str = "id, user_id, name, description, created_at, completed, completed_at";

pub async fn create(
    pool: &PgPool,
    user_id: i32,
    name: &str,
    description: &str,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (user_id, name, description) VALUES ($1, $2, $3) RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Lists the user's tasks, filtered by completion and name, in the requested order.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: i32,
    params: &TaskListParams,
) -> Result<Vec<Task>, sqlx::Error> {
    // ORDER BY cannot be bound; the fragment comes from a fixed whitelist.
    let sql = format!(
        "SELECT {} FROM tasks \
         WHERE user_id = $1 AND completed = ANY($2) AND name ILIKE $3 \
         ORDER BY {}",
        TASK_COLUMNS,
        params.sort.order_by()
    );

    sqlx::query_as::<_, Task>(&sql)
        .bind(user_id)
        .bind(params.filter.completed_values().to_vec())
        .bind(params.search_pattern())
        .fetch_all(pool)
        .await
}

pub async fn find_for_user<'e, E>(
    executor: E,
    user_id: i32,
    task_id: i32,
) -> Result<Option<Task>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE user_id = $1 AND id = $2",
        TASK_COLUMNS
    ))
    .bind(user_id)
    .bind(task_id)
    .fetch_optional(executor)
    .await
}

/// Moves the task to the requested completion state.
///
/// Only a real transition touches the row, so `completed_at` keeps the time of
/// the original completion when a completed task is saved again. Returns `None`
/// when the task is missing or already in that state.
pub async fn set_completed<'e, E>(
    executor: E,
    user_id: i32,
    task_id: i32,
    completed: bool,
) -> Result<Option<Task>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let assignment = if completed {
        "completed = true, completed_at = now()"
    } else {
        "completed = false, completed_at = NULL"
    };

    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET {} \
         WHERE user_id = $1 AND id = $2 AND completed = $3 \
         RETURNING {}",
        assignment, TASK_COLUMNS
    ))
    .bind(user_id)
    .bind(task_id)
    .bind(!completed)
    .fetch_optional(executor)
    .await
}

pub async fn update_description<'e, E>(
    executor: E,
    user_id: i32,
    task_id: i32,
    description: &str,
) -> Result<Option<Task>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET description = $3 WHERE user_id = $1 AND id = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(user_id)
    .bind(task_id)
    .bind(description)
    .fetch_optional(executor)
    .await
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete_for_user(pool: &PgPool, user_id: i32, task_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(task_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
