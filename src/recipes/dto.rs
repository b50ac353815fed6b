use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::client::{IngredientInformation, RecipeInformation, RecipeSummary, SearchFilters};
use super::repo_types::SavedRecipe;
use super::services::RankedRecipe;
use crate::nutrition::Nutrient;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub smart: bool,
    /// Comma separated; overrides the pantry in smart mode.
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub max_ready_time: Option<u32>,
}

/// Diets the recipe API understands, offered as search filter choices.
pub const DIETS: [&str; 7] = [
    "vegetarian",
    "vegan",
    "pescetarian",
    "gluten free",
    "ketogenic",
    "paleo",
    "whole30",
];

impl SearchQuery {
    pub fn filters(&self) -> SearchFilters {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        SearchFilters {
            diet: clean(&self.diet),
            sort: clean(&self.sort),
            max_ready_time: self.max_ready_time.filter(|m| *m > 0),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub smart: bool,
    pub diet: Option<String>,
    pub diets: Vec<&'static str>,
    pub results: Vec<RecipeSummary>,
    pub smart_results: Vec<RankedRecipe>,
    pub deficient: Vec<Nutrient>,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientAmount {
    pub nutrient: Nutrient,
    pub amount: f64,
    pub unit: &'static str,
    pub percent_of_target: f64,
}

impl NutrientAmount {
    pub fn of(nutrient: Nutrient, amount: f64) -> Self {
        Self {
            nutrient,
            amount,
            unit: nutrient.unit(),
            percent_of_target: amount / nutrient.daily_target() * 100.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Vec<String>,
    pub nutrients: Vec<NutrientAmount>,
    pub saved: bool,
}

impl RecipeDetail {
    pub fn from_information(info: RecipeInformation, saved: bool) -> Self {
        let tracked = info.tracked_nutrients();
        Self {
            nutrients: Nutrient::ALL
                .into_iter()
                .map(|n| NutrientAmount::of(n, tracked.get(n)))
                .collect(),
            ingredients: info
                .extended_ingredients
                .into_iter()
                .map(|i| if i.original.is_empty() { i.name } else { i.original })
                .collect(),
            id: info.id,
            title: info.title,
            image: info.image,
            source_url: info.source_url,
            ready_in_minutes: info.ready_in_minutes,
            servings: info.servings,
            summary: info.summary,
            instructions: info.instructions,
            saved,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRecipeRequest {
    pub recipe_id: i64,
    /// Used only when the recipe API cannot describe the recipe.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RedirectForm {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Saved,
    Exists,
    Deleted,
    Missing,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: SaveStatus,
    pub recipe_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<SavedRecipe>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientNutritionQuery {
    #[serde(default = "default_amount")]
    pub amount: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_amount() -> f64 {
    100.0
}
fn default_unit() -> String {
    "g".into()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountWithUnit {
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientNutrition {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub nutrients: BTreeMap<&'static str, AmountWithUnit>,
}

impl IngredientNutrition {
    /// Keeps only tracked nutrients, keyed by their food-log field name and
    /// converted to the unit a food log stores them in.
    pub fn from_information(info: IngredientInformation, amount: f64, unit: &str) -> Self {
        let mut nutrients = BTreeMap::new();
        if let Some(block) = &info.nutrition {
            for (nutrient, value) in block.normalized() {
                nutrients.insert(
                    nutrient.key(),
                    AmountWithUnit {
                        amount: value,
                        unit: nutrient.unit().to_string(),
                    },
                );
            }
        }
        Self {
            id: info.id,
            name: info.name,
            amount: info.amount.unwrap_or(amount),
            unit: info.unit.unwrap_or_else(|| unit.to_string()),
            nutrients,
        }
    }
}
