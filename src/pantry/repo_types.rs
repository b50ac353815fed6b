use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PantryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPantryItem {
    pub name: String,
    pub quantity: i32,
    pub unit: String,
}

/// Lowest quantity a pantry row may hold.
pub const MIN_QUANTITY: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityStep {
    Increment,
    Decrement,
}

impl QuantityStep {
    pub fn apply(self, quantity: i32) -> i32 {
        match self {
            QuantityStep::Increment => quantity.saturating_add(1),
            QuantityStep::Decrement => (quantity - 1).max(MIN_QUANTITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_floors_at_one() {
        assert_eq!(QuantityStep::Decrement.apply(3), 2);
        assert_eq!(QuantityStep::Decrement.apply(2), 1);
        assert_eq!(QuantityStep::Decrement.apply(1), 1);
    }

    #[test]
    fn increment_adds_one() {
        assert_eq!(QuantityStep::Increment.apply(1), 2);
        assert_eq!(QuantityStep::Increment.apply(i32::MAX), i32::MAX);
    }
}
