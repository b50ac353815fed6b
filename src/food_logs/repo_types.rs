use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::Nutrients;

/// Food consumption record. Not owned by a user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodLog {
    pub id: Uuid,
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub date: Date,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub nutrients: Nutrients,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Date plus nutrient columns, all the aggregation needs.
#[derive(Debug, Clone, FromRow)]
pub struct DatedNutrients {
    pub date: Date,
    #[sqlx(flatten)]
    pub nutrients: Nutrients,
}

/// Validated values ready for insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub date: Date,
    pub nutrients: Nutrients,
}

/// Optional narrowing of the food log list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub category: Option<String>,
}

/// Orderings the list endpoint accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSort {
    DateAsc,
    #[default]
    DateDesc,
    NameAsc,
    NameDesc,
    CaloriesAsc,
    CaloriesDesc,
}

impl LogSort {
    /// Unknown keys fall back to newest first.
    pub fn from_key(key: &str) -> Self {
        match key {
            "date_asc" => LogSort::DateAsc,
            "name_asc" => LogSort::NameAsc,
            "name_desc" => LogSort::NameDesc,
            "calories_asc" => LogSort::CaloriesAsc,
            "calories_desc" => LogSort::CaloriesDesc,
            _ => LogSort::DateDesc,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            LogSort::DateAsc => "date ASC",
            LogSort::DateDesc => "date DESC",
            LogSort::NameAsc => "lower(food_name) ASC",
            LogSort::NameDesc => "lower(food_name) DESC",
            LogSort::CaloriesAsc => "calories ASC",
            LogSort::CaloriesDesc => "calories DESC",
        }
    }
}
