//! Client for the Spoonacular recipe/nutrition API.
//!
//! Only the five GET endpoints the app needs are covered. Every call carries
//! the configured key as the `apiKey` query parameter; non-2xx answers become
//! [`RecipeApiError::Http`] so callers can decide how to degrade.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::RecipeApiConfig;
use crate::nutrition::{Nutrient, Nutrients};

#[derive(Debug, thiserror::Error)]
pub enum RecipeApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Optional complex-search filters. Empty values are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub diet: Option<String>,
    pub sort: Option<String>,
    pub max_ready_time: Option<u32>,
}

impl SearchFilters {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(diet) = self.diet.as_deref().filter(|d| !d.is_empty()) {
            params.push(("diet", diet.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            params.push(("sort", sort.to_string()));
        }
        if let Some(minutes) = self.max_ready_time.filter(|m| *m > 0) {
            params.push(("maxReadyTime", minutes.to_string()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct ComplexSearchResponse {
    #[serde(default)]
    results: Vec<RecipeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedIngredient {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub used_ingredients: Vec<NamedIngredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<NamedIngredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiNutrient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NutritionBlock {
    #[serde(default)]
    pub nutrients: Vec<ApiNutrient>,
}

impl NutritionBlock {
    /// Tracked nutrients paired with their amount in the app's unit.
    /// Untracked names and unconvertible units are dropped.
    pub fn normalized(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.nutrients.iter().filter_map(|n| {
            let nutrient = Nutrient::from_api_name(&n.name)?;
            match nutrient.normalize_amount(n.amount, &n.unit) {
                Some(amount) => Some((nutrient, amount)),
                None => {
                    debug!(name = %n.name, unit = %n.unit, "dropping nutrient with unknown unit");
                    None
                }
            }
        })
    }

    pub fn tracked(&self) -> Nutrients {
        let mut out = Nutrients::default();
        for (nutrient, amount) in self.normalized() {
            *out.get_mut(nutrient) = amount;
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInformation {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<NutritionBlock>,
}

impl RecipeInformation {
    pub fn has_diet(&self, diet: &str) -> bool {
        self.diets.iter().any(|d| d.eq_ignore_ascii_case(diet))
    }

    pub fn tracked_nutrients(&self) -> Nutrients {
        self.nutrition
            .as_ref()
            .map(NutritionBlock::tracked)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSuggestion {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInformation {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub nutrition: Option<NutritionBlock>,
}

#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn complex_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        number: u32,
    ) -> Result<Vec<RecipeSummary>, RecipeApiError>;

    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        number: u32,
    ) -> Result<Vec<IngredientMatch>, RecipeApiError>;

    async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, RecipeApiError>;

    async fn autocomplete_ingredient(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<IngredientSuggestion>, RecipeApiError>;

    async fn ingredient_information(
        &self,
        id: i64,
        amount: f64,
        unit: &str,
    ) -> Result<IngredientInformation, RecipeApiError>;
}

#[derive(Clone)]
pub struct SpoonacularClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(cfg: &RecipeApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build recipe api http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RecipeApiError> {
        debug!(path, "recipe api request");
        let resp = self
            .http
            .get(self.url(path))
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RecipeApiError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn complex_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        number: u32,
    ) -> Result<Vec<RecipeSummary>, RecipeApiError> {
        let mut params = vec![("query", query.to_string()), ("number", number.to_string())];
        params.extend(filters.query_params());
        let body: ComplexSearchResponse = self.get_json("/recipes/complexSearch", &params).await?;
        Ok(body.results)
    }

    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        number: u32,
    ) -> Result<Vec<IngredientMatch>, RecipeApiError> {
        self.get_json(
            "/recipes/findByIngredients",
            &[
                ("ingredients", ingredients.join(",")),
                ("number", number.to_string()),
                ("ranking", "1".to_string()),
                ("ignorePantry", "true".to_string()),
            ],
        )
        .await
    }

    async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, RecipeApiError> {
        self.get_json(
            &format!("/recipes/{id}/information"),
            &[("includeNutrition", "true".to_string())],
        )
        .await
    }

    async fn autocomplete_ingredient(
        &self,
        query: &str,
        number: u32,
    ) -> Result<Vec<IngredientSuggestion>, RecipeApiError> {
        self.get_json(
            "/food/ingredients/autocomplete",
            &[
                ("query", query.to_string()),
                ("number", number.to_string()),
                ("metaInformation", "true".to_string()),
            ],
        )
        .await
    }

    async fn ingredient_information(
        &self,
        id: i64,
        amount: f64,
        unit: &str,
    ) -> Result<IngredientInformation, RecipeApiError> {
        self.get_json(
            &format!("/food/ingredients/{id}/information"),
            &[("amount", amount.to_string()), ("unit", unit.to_string())],
        )
        .await
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory [`RecipeApi`] for handler and ranking tests.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default, Clone)]
    pub struct FakeRecipeApi {
        pub search_results: Vec<RecipeSummary>,
        pub candidates: Vec<IngredientMatch>,
        /// Recipes missing here answer with a 404.
        pub information: HashMap<i64, RecipeInformation>,
        pub suggestions: Vec<IngredientSuggestion>,
        pub ingredients: HashMap<i64, IngredientInformation>,
        pub fail_search: bool,
        /// Filters passed to the most recent complex search.
        pub last_filters: Arc<Mutex<Option<SearchFilters>>>,
    }

    impl FakeRecipeApi {
        pub fn last_filters(&self) -> Option<SearchFilters> {
            self.last_filters.lock().unwrap().clone()
        }
    }

    fn not_found(what: &str) -> RecipeApiError {
        RecipeApiError::Http {
            status: 404,
            message: format!("{what} not found"),
        }
    }

    pub fn nutrition(pairs: &[(&str, f64)]) -> NutritionBlock {
        NutritionBlock {
            nutrients: pairs
                .iter()
                .map(|(name, amount)| ApiNutrient {
                    name: (*name).to_string(),
                    amount: *amount,
                    unit: String::new(),
                })
                .collect(),
        }
    }

    pub fn candidate(id: i64, title: &str) -> IngredientMatch {
        IngredientMatch {
            id,
            title: title.to_string(),
            image: None,
            used_ingredient_count: 1,
            missed_ingredient_count: 0,
            used_ingredients: vec![NamedIngredient { name: "rice".into() }],
            missed_ingredients: Vec::new(),
        }
    }

    pub fn information(id: i64, title: &str, pairs: &[(&str, f64)]) -> RecipeInformation {
        RecipeInformation {
            id,
            title: title.to_string(),
            image: Some(format!("https://img.example/{id}.jpg")),
            source_url: Some(format!("https://recipes.example/{id}")),
            ready_in_minutes: Some(30),
            servings: Some(2),
            summary: None,
            instructions: None,
            extended_ingredients: Vec::new(),
            diets: Vec::new(),
            nutrition: Some(nutrition(pairs)),
        }
    }

    #[async_trait]
    impl RecipeApi for FakeRecipeApi {
        async fn complex_search(
            &self,
            _query: &str,
            filters: &SearchFilters,
            number: u32,
        ) -> Result<Vec<RecipeSummary>, RecipeApiError> {
            *self.last_filters.lock().unwrap() = Some(filters.clone());
            if self.fail_search {
                return Err(RecipeApiError::Http {
                    status: 402,
                    message: "quota exceeded".into(),
                });
            }
            Ok(self
                .search_results
                .iter()
                .take(number as usize)
                .cloned()
                .collect())
        }

        async fn find_by_ingredients(
            &self,
            _ingredients: &[String],
            number: u32,
        ) -> Result<Vec<IngredientMatch>, RecipeApiError> {
            Ok(self
                .candidates
                .iter()
                .take(number as usize)
                .cloned()
                .collect())
        }

        async fn recipe_information(&self, id: i64) -> Result<RecipeInformation, RecipeApiError> {
            self.information
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("recipe"))
        }

        async fn autocomplete_ingredient(
            &self,
            _query: &str,
            number: u32,
        ) -> Result<Vec<IngredientSuggestion>, RecipeApiError> {
            Ok(self
                .suggestions
                .iter()
                .take(number as usize)
                .cloned()
                .collect())
        }

        async fn ingredient_information(
            &self,
            id: i64,
            _amount: f64,
            _unit: &str,
        ) -> Result<IngredientInformation, RecipeApiError> {
            self.ingredients
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found("ingredient"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn information_parses_api_shape() {
        let raw = r#"{
            "id": 716429,
            "title": "Pasta with Garlic",
            "image": "https://img.example/716429.jpg",
            "sourceUrl": "https://example.com/pasta",
            "readyInMinutes": 45,
            "servings": 2,
            "extendedIngredients": [{"name": "garlic", "original": "2 cloves garlic"}],
            "diets": ["Dairy Free", "vegan"],
            "nutrition": {"nutrients": [
                {"name": "Calories", "amount": 584.5, "unit": "kcal"},
                {"name": "Iron", "amount": 3.1, "unit": "mg"},
                {"name": "Net Carbohydrates", "amount": 80.0, "unit": "g"}
            ]}
        }"#;
        let info: RecipeInformation = serde_json::from_str(raw).unwrap();
        assert_eq!(info.source_url.as_deref(), Some("https://example.com/pasta"));
        assert_eq!(info.ready_in_minutes, Some(45));
        assert!(info.has_diet("dairy free"));
        assert!(!info.has_diet("paleo"));
        let n = info.tracked_nutrients();
        assert_eq!(n.calories, 584.5);
        assert_eq!(n.iron, 3.1);
        assert_eq!(n.carbohydrates, 0.0);
    }

    #[test]
    fn tracked_amounts_are_converted_to_app_units() {
        let raw = r#"{"nutrients": [
            {"name": "Vitamin A", "amount": 5000.0, "unit": "IU"},
            {"name": "Vitamin D", "amount": 2.0, "unit": "mcg"},
            {"name": "Sodium", "amount": 1.2, "unit": "g"},
            {"name": "Iron", "amount": 4.0, "unit": "IU"}
        ]}"#;
        let block: NutritionBlock = serde_json::from_str(raw).unwrap();
        let n = block.tracked();
        assert_eq!(n.vitamin_a, 1500.0);
        assert_eq!(n.vitamin_d, 2.0);
        assert_eq!(n.sodium, 1200.0);
        assert_eq!(n.iron, 0.0);
    }

    #[test]
    fn empty_filters_are_not_sent() {
        assert!(SearchFilters::default().query_params().is_empty());
        let filters = SearchFilters {
            diet: Some("vegan".into()),
            sort: Some(String::new()),
            max_ready_time: Some(30),
        };
        assert_eq!(
            filters.query_params(),
            vec![("diet", "vegan".to_string()), ("maxReadyTime", "30".to_string())]
        );
    }

    #[test]
    fn find_by_ingredients_parses_api_shape() {
        let raw = r#"[{"id": 1, "title": "Rice Bowl", "usedIngredientCount": 2,
            "missedIngredientCount": 1, "usedIngredients": [{"name": "rice"}],
            "missedIngredients": [{"name": "egg"}]}]"#;
        let matches: Vec<IngredientMatch> = serde_json::from_str(raw).unwrap();
        assert_eq!(matches[0].used_ingredient_count, 2);
        assert_eq!(matches[0].missed_ingredients[0].name, "egg");
        assert!(matches[0].image.is_none());
    }

    #[test]
    fn client_joins_paths_without_double_slash() {
        let client = SpoonacularClient::new(&RecipeApiConfig {
            api_key: "k".into(),
            base_url: "https://api.example.com/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            client.url("/recipes/complexSearch"),
            "https://api.example.com/recipes/complexSearch"
        );
        assert_eq!(client.url("food"), "https://api.example.com/food");
    }
}
