use crate::{
    auth::{
        hash_password_blocking, verify_password_blocking, CurrentUser, LoginForm,
        RegistrationForm, TokenService,
    },
    cookies::{self, CookieSettings},
    db,
    error::{AppError, LOGIN_PATH},
    models::UserProfile,
    routes::see_other,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Landing page after a successful login.
pub const HOME_PATH: &str = "/users/home";

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Root of the site; everything starts at the login page.
#[get("/")]
pub async fn index() -> impl Responder {
    see_other(LOGIN_PATH).finish()
}

/// Register a new user
///
/// Validates the form, rejects a name that is already taken, stores the bcrypt
/// hash of the password and sends the client on to the login page.
///
/// ## Responses:
/// - `303 See Other` to `/login` on success.
/// - `400 Bad Request` if the name is taken.
/// - `422 Unprocessable Entity` if validation fails.
#[post("/registration")]
pub async fn register(
    pool: web::Data<PgPool>,
    form: web::Form<RegistrationForm>,
) -> Result<impl Responder, AppError> {
    form.validate()?;
    let form = form.into_inner();

    if db::users::find_by_name(&pool, &form.name).await?.is_some() {
        return Err(AppError::BadRequest("Name already taken".into()));
    }

    let hashed_password = hash_password_blocking(form.password).await?;

    let user = match db::users::create(&pool, &form.name, &form.email, &hashed_password).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same name.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::BadRequest("Name already taken".into()));
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("registered user {} ({})", user.name, user.id);
    Ok(see_other(LOGIN_PATH).finish())
}

/// Login page
///
/// A client that still holds a valid session goes straight to the home page.
/// Otherwise the page reports that no one is signed in, dropping any stale
/// token cookie on the way.
#[get("/login")]
pub async fn login_page(req: HttpRequest, tokens: web::Data<TokenService>) -> impl Responder {
    match req.cookie(cookies::TOKEN_COOKIE) {
        Some(cookie) if tokens.verify_token(cookie.value()).is_ok() => {
            see_other(HOME_PATH).finish()
        }
        Some(_) => HttpResponse::Ok()
            .cookie(cookies::removal(cookies::TOKEN_COOKIE))
            .json(json!({ "authenticated": false })),
        None => HttpResponse::Ok().json(json!({ "authenticated": false })),
    }
}

/// Login user
///
/// Checks the name and password, then stores a freshly signed token in the
/// `token` cookie and redirects to the home page.
///
/// ## Responses:
/// - `303 See Other` to `/users/home` with the session cookie.
/// - `401 Unauthorized` for an unknown name or a wrong password.
/// - `422 Unprocessable Entity` if validation fails.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    cookie_settings: web::Data<CookieSettings>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    form.validate()?;
    let form = form.into_inner();

    let user = match db::users::find_by_name(&pool, &form.name).await? {
        Some(user) => user,
        None => {
            log::warn!("login attempt for unknown user {:?}", form.name);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    if !verify_password_blocking(form.password, user.hashed_password.clone()).await? {
        log::warn!("wrong password for user {}", user.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = tokens.generate_token(user.id)?;
    log::info!("user {} logged in", user.id);

    Ok(see_other(HOME_PATH)
        .cookie(cookies::session(
            token,
            tokens.cookie_max_age(),
            &cookie_settings,
        ))
        .finish())
}

/// Drops the session cookie and returns to the login page.
#[get("/logout")]
pub async fn logout(user: CurrentUser) -> impl Responder {
    log::info!("user {} logged out", user.id());
    see_other(LOGIN_PATH)
        .cookie(cookies::removal(cookies::TOKEN_COOKIE))
        .finish()
}

/// The signed-in user's home page.
#[get("/users/home")]
pub async fn home(user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(UserProfile::from(&user.0))
}
