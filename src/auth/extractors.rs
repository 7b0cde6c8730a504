use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::token::Claims;
use crate::db;
use crate::error::AppError;
use crate::models::User;

/// The signed-in user, loaded from the database.
///
/// Relies on `AuthMiddleware` having stored the token's `Claims` in the request
/// extensions. A token whose user has since disappeared counts as no session
/// at all and fails with `AppError::LoginRequired`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move { load_user(claims, pool).await.map_err(ActixError::from) })
    }
}

async fn load_user(
    claims: Option<Claims>,
    pool: Option<web::Data<PgPool>>,
) -> Result<CurrentUser, AppError> {
    let claims = claims.ok_or(AppError::LoginRequired)?;
    let pool = pool
        .ok_or_else(|| AppError::InternalServerError("Database pool not configured".into()))?;

    match db::users::find_by_id(&pool, claims.sub).await? {
        Some(user) => Ok(CurrentUser(user)),
        None => {
            log::warn!("session token refers to missing user {}", claims.sub);
            Err(AppError::LoginRequired)
        }
    }
}
