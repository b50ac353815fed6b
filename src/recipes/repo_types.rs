use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A user's bookmark of an external recipe, with cached display fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SavedRecipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSavedRecipe {
    pub recipe_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
}
