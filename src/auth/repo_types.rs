use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account owning grocery, pantry, supplement and saved-recipe rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2, never leaves the server
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
