use serde::{Deserialize, Serialize};

use super::repo_types::{GroceryItem, NewGroceryItem};
use crate::error::{AppError, AppResult};
use crate::pantry::{dto::DEFAULT_UNIT, repo_types::NewPantryItem};

pub const GROCERY_CATEGORIES: &[&str] = &[
    "produce",
    "dairy",
    "meat",
    "bakery",
    "pantry",
    "frozen",
    "beverages",
    "household",
    "other",
];

/// Unknown or blank categories fall back to "other".
pub fn normalize_category(raw: &str) -> String {
    let c = raw.trim().to_lowercase();
    if GROCERY_CATEGORIES.contains(&c.as_str()) {
        c
    } else {
        "other".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroceryItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl GroceryItemInput {
    fn normalize(self) -> Option<NewGroceryItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(NewGroceryItem {
            name: name.to_string(),
            quantity: self.quantity.unwrap_or_default().trim().to_string(),
            category: normalize_category(self.category.as_deref().unwrap_or_default()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AddPayload {
    Batch {
        items: Vec<GroceryItemInput>,
        #[serde(default)]
        next: Option<String>,
    },
    Single(GroceryItemInput),
}

/// Parsed body of the add endpoint.
#[derive(Debug, PartialEq)]
pub struct AddRequest {
    pub items: Vec<NewGroceryItem>,
    pub next: Option<String>,
}

/// Accepts a single item or `{items: [...], next}`; items with blank names are dropped.
pub fn parse_add_payload(body: &[u8]) -> AppResult<AddRequest> {
    let payload: AddPayload =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let (inputs, next) = match payload {
        AddPayload::Batch { items, next } => (items, next),
        AddPayload::Single(item) => (vec![item], None),
    };
    let items: Vec<_> = inputs
        .into_iter()
        .filter_map(GroceryItemInput::normalize)
        .collect();
    if items.is_empty() {
        return Err(AppError::BadRequest("no items with a name were submitted".into()));
    }
    Ok(AddRequest { items, next })
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdate {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct GroceryGroup {
    pub category: String,
    pub items: Vec<GroceryItem>,
}

/// Groups in category order; unpurchased items first inside each group.
pub fn group_by_category(items: Vec<GroceryItem>) -> Vec<GroceryGroup> {
    let mut groups: Vec<GroceryGroup> = GROCERY_CATEGORIES
        .iter()
        .map(|c| GroceryGroup {
            category: (*c).to_string(),
            items: Vec::new(),
        })
        .collect();
    for item in items {
        let idx = GROCERY_CATEGORIES
            .iter()
            .position(|c| *c == item.category)
            .unwrap_or(GROCERY_CATEGORIES.len() - 1);
        groups[idx].items.push(item);
    }
    for g in &mut groups {
        g.items.sort_by_key(|i| i.purchased);
    }
    groups.retain(|g| !g.items.is_empty());
    groups
}

/// "2 lbs" -> (2, "lbs"); anything without a leading whole count is one
/// piece. Fractions such as "1.5 kg" or "1/2 cup" are not counts.
pub fn split_quantity(raw: &str) -> (i32, String) {
    let raw = raw.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    let whole = raw[digits.len()..]
        .chars()
        .next()
        .map_or(true, |c| c.is_whitespace() || c.is_alphabetic());
    let count = digits
        .parse::<i32>()
        .ok()
        .filter(|n| whole && *n >= 1);
    match count {
        Some(n) => {
            let unit = raw[digits.len()..].trim().to_lowercase();
            let unit = if unit.is_empty() { DEFAULT_UNIT.to_string() } else { unit };
            (n, unit)
        }
        None => (1, DEFAULT_UNIT.to_string()),
    }
}

pub fn to_pantry_item(item: &GroceryItem) -> NewPantryItem {
    let (quantity, unit) = split_quantity(&item.quantity);
    NewPantryItem {
        name: item.name.clone(),
        quantity,
        unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn item(name: &str, category: &str, purchased: bool) -> GroceryItem {
        GroceryItem {
            id: Uuid::new_v4(),
            user_id: None,
            name: name.into(),
            quantity: String::new(),
            category: category.into(),
            purchased,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn batch_creates_one_record_per_named_item() {
        let body = br#"{
            "items": [
                {"name": "Milk", "quantity": "1 l", "category": "Dairy"},
                {"name": "Apples", "quantity": "6"},
                {"name": "   "},
                {"name": "Bread", "category": "bakery"}
            ],
            "next": "/pantry"
        }"#;
        let req = parse_add_payload(body).unwrap();
        assert_eq!(req.items.len(), 3);
        assert_eq!(req.next.as_deref(), Some("/pantry"));
        assert_eq!(req.items[0].category, "dairy");
        assert_eq!(req.items[1].category, "other");
        assert_eq!(req.items[2].name, "Bread");
    }

    #[test]
    fn single_item_body() {
        let req = parse_add_payload(br#"{"name": "Eggs", "quantity": "12"}"#).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.next, None);
        assert_eq!(req.items[0].quantity, "12");
    }

    #[test]
    fn malformed_json_is_bad_request_with_message() {
        match parse_add_payload(b"{\"items\": [") {
            Err(AppError::BadRequest(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            parse_add_payload(br#"{"items": []}"#),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn grouping_orders_categories_and_purchased_last() {
        let groups = group_by_category(vec![
            item("Soap", "household", false),
            item("Milk", "dairy", true),
            item("Cheese", "dairy", false),
            item("Mystery", "unknown", false),
        ]);
        let cats: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(cats, vec!["dairy", "household", "other"]);
        assert_eq!(groups[0].items[0].name, "Cheese");
        assert_eq!(groups[0].items[1].name, "Milk");
    }

    #[test]
    fn quantity_split_for_pantry() {
        assert_eq!(split_quantity("2 lbs"), (2, "lbs".into()));
        assert_eq!(split_quantity("12"), (12, "pcs".into()));
        assert_eq!(split_quantity("a bunch"), (1, "pcs".into()));
        assert_eq!(split_quantity("0 kg"), (1, "pcs".into()));
        assert_eq!(split_quantity(""), (1, "pcs".into()));
        assert_eq!(split_quantity("3kg"), (3, "kg".into()));
        assert_eq!(split_quantity("1.5 kg"), (1, "pcs".into()));
        assert_eq!(split_quantity("1/2 cup"), (1, "pcs".into()));
        assert_eq!(split_quantity("99999999999 g"), (1, "pcs".into()));
    }
}
