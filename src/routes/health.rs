use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::db;

/// Health check endpoint
///
/// Reports whether the database answers, with the current timestamp.
/// Responds `503 Service Unavailable` while the database is unreachable.
#[get("/health")]
pub async fn health(pool: web::Data<PgPool>) -> impl Responder {
    match db::ping(&pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "ok",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            log::error!("health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unreachable",
                "timestamp": Utc::now()
            }))
        }
    }
}
