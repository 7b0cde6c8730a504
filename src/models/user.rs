use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An account row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// What the home page shows about the signed-in user.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
