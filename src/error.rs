//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failure modes of the tracker: missing records, rejected credentials, unconfirmed
//! deletions, invalid form input, and database trouble.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly. Most variants become a JSON body of the form `{"code": 404, "error": "..."}`;
//! `LoginRequired` instead redirects the browser to the login page.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow the `?` operator.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::cookies;

/// Path unauthenticated requests are redirected to.
pub const LOGIN_PATH: &str = "/login";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Credentials were supplied but rejected (HTTP 401).
    Unauthorized(String),
    /// No valid session; the client is sent to the login page (HTTP 303).
    LoginRequired,
    /// Malformed or conflicting request (HTTP 400).
    BadRequest(String),
    /// The action is understood but not allowed in the current state (HTTP 403).
    Forbidden(String),
    /// The requested resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the database driver (HTTP 500).
    /// The detail is logged, the client only sees a generic message.
    DatabaseError(String),
    /// Form input failed validation (HTTP 422).
    ValidationError(String),
}

impl AppError {
    /// The HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired => StatusCode::SEE_OTHER,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            AppError::LoginRequired => "Login required".to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::LoginRequired => write!(f, "Login required"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // A stale or forged token cookie would otherwise bounce the browser
            // between /login and the protected page, so it is dropped here.
            AppError::LoginRequired => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .cookie(cookies::removal(cookies::TOKEN_COOKIE))
                .finish(),
            AppError::DatabaseError(detail) => {
                log::error!("database error: {}", detail);
                HttpResponse::build(self.status()).json(json!({
                    "code": self.status().as_u16(),
                    "error": self.public_message()
                }))
            }
            _ => HttpResponse::build(self.status()).json(json!({
                "code": self.status().as_u16(),
                "error": self.public_message()
            })),
        }
    }
}

/// `sqlx::Error::RowNotFound` maps to `NotFound`, everything else to `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token processing failures are authentication failures.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
