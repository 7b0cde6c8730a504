#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_web::{cookie::Cookie, dev::ServiceResponse, http::header, test::TestRequest};
use jsonwebtoken::Algorithm;
use sqlx::{postgres::PgPoolOptions, PgPool};
use taskdesk::auth::TokenService;

pub const PASSWORD: &str = "Password123!";

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Pool on `DATABASE_URL` with migrations applied, or `None` when no database is configured.
pub async fn test_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    taskdesk::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// Pool that never connects; enough for requests rejected before any query.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        .expect("lazy pool")
}

pub fn tokens() -> TokenService {
    TokenService::new(
        "integration-test-secret",
        Algorithm::HS256,
        chrono::Duration::minutes(10),
    )
}

/// Account name that is valid for the registration form and unused so far.
pub fn unique_name(prefix: &str) -> String {
    let micros = chrono::Utc::now().timestamp_micros() % 1_000_000_000_000;
    format!(
        "{}{}_{}",
        prefix,
        micros,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

pub fn registration(name: &str) -> TestRequest {
    TestRequest::post().uri("/registration").set_form(&[
        ("name", name),
        ("email", "tester@example.com"),
        ("password", PASSWORD),
        ("confirm", PASSWORD),
    ])
}

pub fn login(name: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_form(&[("name", name), ("password", password)])
}

pub fn cookie_named<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Deletes the account; its tasks go with it.
pub async fn remove_user(pool: &PgPool, name: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await;
}

/// The application as `main` assembles it, minus CORS and request logging.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(common::tokens()))
                .app_data(actix_web::web::Data::new(
                    taskdesk::cookies::CookieSettings::default(),
                ))
                .wrap(taskdesk::auth::AuthMiddleware)
                .configure(taskdesk::routes::config),
        )
        .await
    };
}

/// Registers `$name`, logs in and yields the session cookie.
macro_rules! sign_up {
    ($app:expr, $name:expr) => {{
        let resp =
            actix_web::test::call_service(&$app, common::registration($name).to_request()).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SEE_OTHER,
            "registration failed"
        );
        let resp = actix_web::test::call_service(
            &$app,
            common::login($name, common::PASSWORD).to_request(),
        )
        .await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::SEE_OTHER,
            "login failed"
        );
        common::cookie_named(&resp, taskdesk::cookies::TOKEN_COOKIE)
            .expect("login should set the token cookie")
    }};
}
