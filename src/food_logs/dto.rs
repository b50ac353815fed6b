use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{LogFilter, LogSort, NewFoodLog};
use crate::error::{AppResult, FieldErrors};
use crate::nutrition::{Nutrient, Nutrients};

pub const FOOD_CATEGORIES: &[&str] = &[
    "fruits",
    "vegetables",
    "grains",
    "protein",
    "dairy",
    "fats",
    "beverages",
    "snacks",
    "other",
];

pub const FOOD_UNITS: &[&str] = &[
    "g", "kg", "ml", "l", "oz", "lb", "cup", "tbsp", "tsp", "piece", "serving",
];

const MAX_NAME_LEN: usize = 200;
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct FoodLogInput {
    #[serde(default)]
    pub food_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub date: Option<Date>,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

fn default_quantity() -> f64 {
    1.0
}
fn default_unit() -> String {
    "serving".into()
}
fn default_category() -> String {
    "other".into()
}

impl FoodLogInput {
    /// Checks the input against `today` and returns the normalized record.
    pub fn validate(self, today: Date) -> AppResult<NewFoodLog> {
        let mut errors = FieldErrors::new();

        let food_name = self.food_name.trim().to_string();
        if food_name.is_empty() {
            errors.add("food_name", "This field is required.");
        } else if food_name.chars().count() > MAX_NAME_LEN {
            errors.add(
                "food_name",
                format!("Ensure this value has at most {MAX_NAME_LEN} characters."),
            );
        }

        if !self.quantity.is_finite() || self.quantity < 0.0 {
            errors.add("quantity", "Quantity cannot be negative.");
        }

        let unit = self.unit.trim().to_lowercase();
        if !FOOD_UNITS.contains(&unit.as_str()) {
            errors.add("unit", format!("'{}' is not a valid unit.", self.unit));
        }

        let category = self.category.trim().to_lowercase();
        if !FOOD_CATEGORIES.contains(&category.as_str()) {
            errors.add(
                "category",
                format!("'{}' is not a valid category.", self.category),
            );
        }

        let date = self.date.unwrap_or(today);
        if date > today {
            errors.add("date", "Date cannot be in the future.");
        }

        for n in Nutrient::ALL {
            let v = self.nutrients.get(n);
            if !v.is_finite() || v < 0.0 {
                errors.add(n.key(), format!("{} cannot be negative.", n.label()));
            }
        }

        errors.into_result()?;
        Ok(NewFoodLog {
            food_name,
            quantity: self.quantity,
            unit,
            category,
            date,
            nutrients: self.nutrients,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub date: Option<Date>,
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

impl ListQuery {
    /// A single `date` wins over `start`/`end`.
    pub fn bounds(&self) -> (Option<Date>, Option<Date>) {
        match self.date {
            Some(d) => (Some(d), Some(d)),
            None => (self.start, self.end),
        }
    }

    pub fn filter(&self) -> LogFilter {
        let (start, end) = self.bounds();
        LogFilter {
            start,
            end,
            category: self
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty()),
        }
    }

    pub fn sort(&self) -> LogSort {
        self.sort.as_deref().map(LogSort::from_key).unwrap_or_default()
    }
}

/// Position of one page within a listing of `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub total_pages: u32,
    pub offset: i64,
}

impl PageWindow {
    /// Pages count from 1. Requests past the end land on the last page.
    pub fn new(requested: Option<u32>, total: i64) -> Self {
        let per_page = i64::from(PAGE_SIZE);
        let total_pages = u32::try_from((total.max(0) + per_page - 1) / per_page).unwrap_or(u32::MAX);
        let page = requested.unwrap_or(1).clamp(1, total_pages.max(1));
        Self {
            page,
            total_pages,
            offset: i64::from(page - 1) * per_page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 05 - 20);

    fn input(json: &str) -> FoodLogInput {
        serde_json::from_str(json).unwrap()
    }

    fn field_errors(err: AppError) -> crate::error::FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn future_date_is_rejected() {
        let err = input(r#"{"food_name": "Apple", "date": "2024-05-21"}"#)
            .validate(TODAY)
            .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(
            errors.get("date"),
            Some(&["Date cannot be in the future.".to_string()][..])
        );
    }

    #[test]
    fn today_is_accepted_and_defaults_apply() {
        let log = input(r#"{"food_name": " Apple ", "date": "2024-05-20", "calories": 95, "fiber": 4.4}"#)
            .validate(TODAY)
            .unwrap();
        assert_eq!(log.food_name, "Apple");
        assert_eq!(log.date, TODAY);
        assert_eq!(log.unit, "serving");
        assert_eq!(log.category, "other");
        assert_eq!(log.nutrients.calories, 95.0);
        assert_eq!(log.nutrients.fiber, 4.4);
        assert_eq!(log.nutrients.zinc, 0.0);
    }

    #[test]
    fn missing_date_means_today() {
        let log = input(r#"{"food_name": "Oats", "unit": "G", "category": "Grains"}"#)
            .validate(TODAY)
            .unwrap();
        assert_eq!(log.date, TODAY);
        assert_eq!(log.unit, "g");
        assert_eq!(log.category, "grains");
    }

    #[test]
    fn negative_numbers_are_field_errors() {
        let err = input(r#"{"food_name": "Bad", "quantity": -1, "sodium": -5, "unit": "bucket"}"#)
            .validate(TODAY)
            .unwrap_err();
        let errors = field_errors(err);
        assert!(errors.get("quantity").is_some());
        assert!(errors.get("sodium").is_some());
        assert!(errors.get("unit").is_some());
        assert!(errors.get("calories").is_none());
    }

    #[test]
    fn blank_name_is_required() {
        let errors = field_errors(input(r#"{"food_name": "   "}"#).validate(TODAY).unwrap_err());
        assert!(errors.get("food_name").is_some());
    }

    #[test]
    fn single_date_overrides_range() {
        let q = ListQuery {
            date: Some(TODAY),
            start: Some(date!(2024 - 01 - 01)),
            end: None,
            ..Default::default()
        };
        assert_eq!(q.bounds(), (Some(TODAY), Some(TODAY)));
    }

    #[test]
    fn list_query_parses_sort_category_and_page() {
        let q: ListQuery = serde_json::from_str(
            r#"{"sort": "calories_desc", "category": " Fruits ", "page": 3}"#,
        )
        .unwrap();
        assert_eq!(q.sort(), LogSort::CaloriesDesc);
        assert_eq!(q.filter().category.as_deref(), Some("fruits"));
        assert_eq!(q.page, Some(3));

        let q = ListQuery {
            sort: Some("price_desc".into()),
            category: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(q.sort(), LogSort::DateDesc);
        assert!(q.filter().category.is_none());
    }

    #[test]
    fn page_window_clamps_to_existing_pages() {
        assert_eq!(
            PageWindow::new(None, 0),
            PageWindow { page: 1, total_pages: 0, offset: 0 }
        );
        assert_eq!(
            PageWindow::new(Some(2), 25),
            PageWindow { page: 2, total_pages: 3, offset: 10 }
        );
        assert_eq!(PageWindow::new(Some(9), 25).page, 3);
        assert_eq!(PageWindow::new(Some(9), 25).offset, 20);
        assert_eq!(PageWindow::new(Some(0), 25).page, 1);
        assert_eq!(PageWindow::new(Some(1), 10).total_pages, 1);
    }
}
