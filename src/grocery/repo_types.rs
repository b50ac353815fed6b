use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroceryItem {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub quantity: String,
    pub category: String,
    pub purchased: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGroceryItem {
    pub name: String,
    pub quantity: String,
    pub category: String,
}
