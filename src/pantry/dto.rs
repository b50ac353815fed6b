use serde::Deserialize;

use super::repo_types::{NewPantryItem, MIN_QUANTITY};
use crate::error::{AppResult, FieldErrors};

pub const DEFAULT_UNIT: &str = "pcs";

#[derive(Debug, Deserialize)]
pub struct PantryItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub unit: String,
}

fn default_quantity() -> i32 {
    MIN_QUANTITY
}

impl PantryItemInput {
    pub fn validate(self) -> AppResult<NewPantryItem> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", "This field is required.");
        }
        if self.quantity < MIN_QUANTITY {
            errors.add("quantity", format!("Quantity must be at least {MIN_QUANTITY}."));
        }
        let unit = match self.unit.trim() {
            "" => DEFAULT_UNIT.to_string(),
            u => u.to_lowercase(),
        };
        errors.into_result()?;
        Ok(NewPantryItem {
            name,
            quantity: self.quantity,
            unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_normalization() {
        let item: PantryItemInput = serde_json::from_str(r#"{"name": " Rice "}"#).unwrap();
        let item = item.validate().unwrap();
        assert_eq!(item.name, "Rice");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit, "pcs");
    }

    #[test]
    fn zero_or_negative_quantity_rejected() {
        let item: PantryItemInput =
            serde_json::from_str(r#"{"name": "Rice", "quantity": 0, "unit": "KG"}"#).unwrap();
        assert!(item.validate().is_err());
        let item: PantryItemInput =
            serde_json::from_str(r#"{"name": "Rice", "quantity": -3}"#).unwrap();
        assert!(item.validate().is_err());
    }
}
