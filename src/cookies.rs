//! Cookie construction for the session token and the confirm-delete flag.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

/// Holds the signed session token.
pub const TOKEN_COOKIE: &str = "token";
/// Set by the delete-confirmation page, required by the delete and cancel actions.
pub const CONFIRM_DELETE_COOKIE: &str = "allow_delete";

/// Cookie attributes that depend on deployment configuration.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Adds the `Secure` attribute; enable behind HTTPS.
    pub secure: bool,
    /// Lifetime of the confirm-delete flag.
    pub confirm_delete_ttl: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            confirm_delete_ttl: Duration::seconds(300),
        }
    }
}

/// Session cookie carrying `token`, living as long as the token itself.
pub fn session(token: String, ttl: Duration, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(ttl)
        .finish()
}

/// Confirm-delete flag for `task_id`.
pub fn confirm_delete(task_id: i32, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build(CONFIRM_DELETE_COOKIE, task_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(settings.secure)
        .max_age(settings.confirm_delete_ttl)
        .finish()
}

/// An expired, empty cookie that makes the browser drop `name`.
pub fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// True only when the confirm-delete flag on `req` names exactly `task_id`.
pub fn deletion_confirmed(req: &HttpRequest, task_id: i32) -> bool {
    req.cookie(CONFIRM_DELETE_COOKIE)
        .map(|cookie| cookie.value() == task_id.to_string())
        .unwrap_or(false)
}
