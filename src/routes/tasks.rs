use crate::{
    auth::CurrentUser,
    config::task_params::{filter_labels, sort_labels, OptionLabel},
    cookies::{self, CookieSettings},
    db,
    error::AppError,
    models::{CreateTaskForm, EditAction, EditTaskForm, Task, TaskListQuery},
    routes::see_other,
};
use actix_web::{
    error::ResponseError, get, post, route, web, HttpRequest, HttpResponse, Responder,
};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

/// Where the task list lives; creation and deletion return here.
pub const TASKS_PATH: &str = "/tasks";

fn task_not_found(task_id: i32) -> AppError {
    AppError::NotFound(format!("Task with id={} not found", task_id))
}

/// Body of the task list page.
#[derive(Debug, Serialize)]
pub struct TaskListPage {
    pub tasks: Vec<Task>,
    /// The `sorted` value as requested (or its default).
    pub sort_option: String,
    /// The `filter` value as requested (or its default).
    pub filter_option: String,
    pub search_query: String,
    pub sort_options: Vec<OptionLabel>,
    pub filter_options: Vec<OptionLabel>,
}

/// Body of a single task's page.
#[derive(Debug, Serialize)]
pub struct TaskPage {
    pub task: Task,
    pub edit_mode: bool,
}

/// Creates a new task for the authenticated user.
///
/// ## Form fields:
/// - `name`: 4 to 25 characters.
/// - `description`: 4 to 250 characters.
///
/// ## Responses:
/// - `303 See Other` to `/tasks` on success.
/// - `422 Unprocessable Entity` if validation fails.
#[post("/create")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    form: web::Form<CreateTaskForm>,
) -> Result<impl Responder, AppError> {
    form.validate()?;

    let task = db::tasks::create(&pool, user.id(), &form.name, &form.description).await?;
    log::info!("user {} created task {}", user.id(), task.id);

    Ok(see_other(TASKS_PATH).finish())
}

/// Lists the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `sorted` (optional): `up` (default), `down`, `completed` or `name`.
/// - `filter` (optional): `all` (default), `completed` or `uncompleted`.
/// - `search` (optional): case-insensitive substring of the task name.
///
/// Unrecognised `sorted`/`filter` values list tasks with the defaults while the
/// response still echoes what was asked for.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let params = query.params();
    let tasks = db::tasks::list_for_user(&pool, user.id(), &params).await?;

    let query = query.into_inner();
    Ok(HttpResponse::Ok().json(TaskListPage {
        tasks,
        sort_option: query
            .sorted
            .unwrap_or_else(|| params.sort.as_param().to_string()),
        filter_option: query
            .filter
            .unwrap_or_else(|| params.filter.as_param().to_string()),
        search_query: params.search,
        sort_options: sort_labels(),
        filter_options: filter_labels(),
    }))
}

/// Shows one task in view mode.
///
/// ## Responses:
/// - `200 OK`: `{"task": ..., "edit_mode": false}`.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
#[get("/{task_id:\\d+}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = db::tasks::find_for_user(&**pool, user.id(), task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))?;

    Ok(HttpResponse::Ok().json(TaskPage {
        task,
        edit_mode: false,
    }))
}

/// Handles the buttons on a task's page.
///
/// - `change`: answers with the task in edit mode.
/// - `save`: validates `description`, applies the `completed` checkbox
///   (`"True"` completes, anything else reopens) and the new description in one
///   transaction, then answers with the refreshed task.
/// - neither: same as viewing the task.
///
/// ## Responses:
/// - `200 OK`: `{"task": ..., "edit_mode": bool}`.
/// - `404 Not Found`: the task does not exist or belongs to someone else.
/// - `422 Unprocessable Entity`: `save` with an invalid description.
#[post("/{task_id:\\d+}")]
pub async fn edit_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    form: web::Form<EditTaskForm>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = db::tasks::find_for_user(&**pool, user.id(), task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))?;

    let page = match form.into_inner().action()? {
        EditAction::View => TaskPage {
            task,
            edit_mode: false,
        },
        EditAction::Edit => TaskPage {
            task,
            edit_mode: true,
        },
        EditAction::Save {
            description,
            completed,
        } => {
            let mut tx = pool.begin().await?;
            // No row back just means the flag already had this value.
            db::tasks::set_completed(&mut *tx, user.id(), task_id, completed).await?;
            let updated = db::tasks::update_description(&mut *tx, user.id(), task_id, &description)
                .await?
                .ok_or_else(|| task_not_found(task_id))?;
            tx.commit().await?;

            TaskPage {
                task: updated,
                edit_mode: false,
            }
        }
    };

    Ok(HttpResponse::Ok().json(page))
}

/// Delete confirmation page.
///
/// Shows the task and sets the confirm-delete flag for it; the delete and
/// cancel actions only proceed while that flag names this task.
#[get("/{task_id:\\d+}/before_delete")]
pub async fn before_delete(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    cookie_settings: web::Data<CookieSettings>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let task = db::tasks::find_for_user(&**pool, user.id(), task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))?;

    Ok(HttpResponse::Ok()
        .cookie(cookies::confirm_delete(task_id, &cookie_settings))
        .json(serde_json::json!({ "task": task })))
}

// Renders `err` and drops the confirm-delete flag along with it.
fn with_flag_cleared(err: AppError) -> HttpResponse {
    let mut response = err.error_response();
    if let Err(e) = response.add_cookie(&cookies::removal(cookies::CONFIRM_DELETE_COOKIE)) {
        log::error!("failed to clear confirm-delete cookie: {}", e);
    }
    response
}

/// Deletes a task whose deletion was confirmed.
///
/// The confirm-delete flag is consumed whatever the outcome.
///
/// ## Responses:
/// - `303 See Other` to `/tasks` after deleting.
/// - `403 Forbidden`: no flag, or a flag for a different task.
/// - `404 Not Found`: the task disappeared after confirmation.
#[route("/{task_id:\\d+}/delete", method = "GET", method = "POST")]
pub async fn delete_task(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> HttpResponse {
    let task_id = task_id.into_inner();

    if !cookies::deletion_confirmed(&req, task_id) {
        log::warn!(
            "user {} tried to delete task {} without confirmation",
            user.id(),
            task_id
        );
        return with_flag_cleared(AppError::Forbidden("Deletion not confirmed".into()));
    }

    match db::tasks::delete_for_user(&pool, user.id(), task_id).await {
        Ok(0) => with_flag_cleared(task_not_found(task_id)),
        Ok(_) => {
            log::info!("user {} deleted task {}", user.id(), task_id);
            see_other(TASKS_PATH)
                .cookie(cookies::removal(cookies::CONFIRM_DELETE_COOKIE))
                .finish()
        }
        Err(e) => with_flag_cleared(e.into()),
    }
}

/// Abandons a confirmed deletion and returns to the task.
///
/// ## Responses:
/// - `303 See Other` to `/tasks/{task_id}`.
/// - `403 Forbidden`: no flag, or a flag for a different task.
#[get("/{task_id:\\d+}/cancel_delete")]
pub async fn cancel_delete(
    req: HttpRequest,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> HttpResponse {
    let task_id = task_id.into_inner();

    if !cookies::deletion_confirmed(&req, task_id) {
        return with_flag_cleared(AppError::Forbidden("Deletion not confirmed".into()));
    }

    log::debug!("user {} cancelled deletion of task {}", user.id(), task_id);
    see_other(&format!("{}/{}", TASKS_PATH, task_id))
        .cookie(cookies::removal(cookies::CONFIRM_DELETE_COOKIE))
        .finish()
}
