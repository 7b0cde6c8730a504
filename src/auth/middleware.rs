use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenService;
use crate::cookies::TOKEN_COOKIE;
use crate::error::AppError;

/// Paths reachable without a session.
pub const PUBLIC_PATHS: &[&str] = &["/", "/health", "/login", "/registration"];

/// Rejects requests without a valid session token.
///
/// The token is read from the `token` cookie, falling back to an
/// `Authorization: Bearer` header. On success the decoded `Claims` are stored
/// in the request extensions; otherwise the request fails with
/// `AppError::LoginRequired`, which sends the client to the login page.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Session token carried by the request, cookie first.
pub fn request_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            return Box::pin(self.service.call(req));
        }

        let tokens = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => tokens.clone(),
            None => {
                let err = AppError::InternalServerError("Token service not configured".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        let claims = request_token(&req).map(|token| tokens.verify_token(&token));

        match claims {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Some(Err(err)) => {
                log::debug!("rejected session token for {}: {}", req.path(), err);
                Box::pin(async move { Err(AppError::LoginRequired.into()) })
            }
            None => Box::pin(async move { Err(AppError::LoginRequired.into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::Claims;
    use crate::cookies;
    use actix_web::{cookie::Cookie, http::StatusCode, test, App, HttpRequest, HttpResponse};
    use jsonwebtoken::Algorithm;

    fn tokens() -> TokenService {
        TokenService::new("middleware-secret", Algorithm::HS256, chrono::Duration::minutes(5))
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match req.extensions().get::<Claims>() {
            Some(claims) => HttpResponse::Ok().body(claims.sub.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    macro_rules! guarded_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(tokens()))
                    .wrap(AuthMiddleware)
                    .route("/health", web::get().to(whoami))
                    .route("/tasks", web::get().to(whoami)),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_missing_token_redirects_to_login() {
        let app = guarded_app!();
        let req = test::TestRequest::get().uri("/tasks").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_rt::test]
    async fn test_invalid_token_redirects_to_login() {
        let app = guarded_app!();
        let req = test::TestRequest::get()
            .uri("/tasks")
            .cookie(Cookie::new(cookies::TOKEN_COOKIE, "forged"))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::SEE_OTHER);
    }

    #[actix_rt::test]
    async fn test_cookie_token_is_accepted() {
        let app = guarded_app!();
        let token = tokens().generate_token(17).unwrap();
        let req = test::TestRequest::get()
            .uri("/tasks")
            .cookie(Cookie::new(cookies::TOKEN_COOKIE, token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "17");
    }

    #[actix_rt::test]
    async fn test_bearer_token_is_accepted() {
        let app = guarded_app!();
        let token = tokens().generate_token(23).unwrap();
        let req = test::TestRequest::get()
            .uri("/tasks")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "23");
    }

    #[actix_rt::test]
    async fn test_public_paths_skip_authentication() {
        let app = guarded_app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");
    }
}
