use std::cmp::Ordering;

use serde::Serialize;
use tracing::{info, warn};

use super::client::{RecipeApi, RecipeSummary, SearchFilters};
use super::dto::{NutrientAmount, SearchResponse, DIETS};
use super::repo_types::NewSavedRecipe;
use crate::nutrition::{Nutrient, Nutrients};

/// How many ranked recipes smart mode returns.
pub const SMART_RESULT_LIMIT: usize = 6;
/// Candidates requested from find-by-ingredients before ranking.
pub const SMART_CANDIDATES: u32 = 12;
pub const SEARCH_RESULTS: u32 = 6;

#[derive(Debug, Clone, Serialize)]
pub struct RankedRecipe {
    pub id: i64,
    pub title: String,
    pub image: Option<String>,
    pub source_url: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub score: f64,
    pub used_ingredients: Vec<String>,
    pub missed_ingredients: Vec<String>,
    /// Amount of each deficient nutrient one serving provides.
    pub covers: Vec<NutrientAmount>,
}

/// Mean of amount / daily target over the deficient intake-goal nutrients.
/// Limit nutrients never add to the score. Zero when nothing is deficient.
pub fn coverage_score(recipe: &Nutrients, deficient: &[Nutrient]) -> f64 {
    let goals: Vec<_> = deficient.iter().filter(|n| !n.is_limit()).collect();
    if goals.is_empty() {
        return 0.0;
    }
    let sum: f64 = goals.iter().map(|n| recipe.get(**n) / n.daily_target()).sum();
    sum / goals.len() as f64
}

/// Picture to show for a recipe. Missing images fall back to the CDN's
/// standard size; placeholder images yield `None` and the recipe is hidden.
pub fn working_image(id: i64, image: Option<String>) -> Option<String> {
    match image {
        Some(url) if url.contains("noimage") => None,
        Some(url) if !url.trim().is_empty() => Some(url),
        _ => Some(format!("https://spoonacular.com/recipeImages/{id}-480x360.jpg")),
    }
}

/// Splits a comma separated list, lowercases, drops blanks and duplicates.
pub fn parse_ingredients(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let name = part.trim().to_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Plain search. API failures degrade to an empty list.
pub async fn search(api: &dyn RecipeApi, query: &str, filters: &SearchFilters) -> Vec<RecipeSummary> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match api.complex_search(query, filters, SEARCH_RESULTS).await {
        Ok(results) => results
            .into_iter()
            .filter_map(|mut r| {
                r.image = Some(working_image(r.id, r.image.take())?);
                Some(r)
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, query, "recipe search failed");
            Vec::new()
        }
    }
}

/// Fetches candidates for `ingredients`, scores each by how well it covers the
/// `deficient` nutrients and keeps the best [`SMART_RESULT_LIMIT`]. Recipes
/// whose detail fetch fails, that do not fit `diet` or that only have a
/// placeholder image are skipped.
pub async fn rank_recipes(
    api: &dyn RecipeApi,
    ingredients: &[String],
    deficient: &[Nutrient],
    diet: Option<&str>,
) -> Vec<RankedRecipe> {
    if ingredients.is_empty() {
        return Vec::new();
    }
    let candidates = match api.find_by_ingredients(ingredients, SMART_CANDIDATES).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "find by ingredients failed");
            return Vec::new();
        }
    };

    let goals: Vec<Nutrient> = deficient.iter().copied().filter(|n| !n.is_limit()).collect();
    let diet = diet.map(str::trim).filter(|d| !d.is_empty());
    let mut ranked = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let info = match api.recipe_information(candidate.id).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, recipe_id = candidate.id, "skipping recipe without details");
                continue;
            }
        };
        if let Some(diet) = diet {
            if !info.has_diet(diet) {
                continue;
            }
        }
        let Some(image) = working_image(info.id, info.image.clone().or(candidate.image)) else {
            continue;
        };
        let nutrients = info.tracked_nutrients();
        ranked.push(RankedRecipe {
            id: info.id,
            title: info.title,
            image: Some(image),
            source_url: info.source_url,
            ready_in_minutes: info.ready_in_minutes,
            score: coverage_score(&nutrients, &goals),
            used_ingredients: candidate.used_ingredients.into_iter().map(|i| i.name).collect(),
            missed_ingredients: candidate
                .missed_ingredients
                .into_iter()
                .map(|i| i.name)
                .collect(),
            covers: goals
                .iter()
                .map(|n| NutrientAmount::of(*n, nutrients.get(*n)))
                .collect(),
        });
    }

    // stable: equal scores keep API order
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(SMART_RESULT_LIMIT);
    info!(returned = ranked.len(), deficient = deficient.len(), "smart recipes ranked");
    ranked
}

/// Smart-mode search response.
pub async fn smart_search(
    api: &dyn RecipeApi,
    ingredients: Vec<String>,
    deficient: Vec<Nutrient>,
    diet: Option<&str>,
) -> SearchResponse {
    let smart_results = rank_recipes(api, &ingredients, &deficient, diet).await;
    SearchResponse {
        smart: true,
        smart_results,
        deficient,
        ingredients,
        diet: diet.map(str::to_string),
        diets: DIETS.to_vec(),
        ..Default::default()
    }
}

const UNKNOWN_TITLE: &str = "Unknown";

/// Bookmark fields for `recipe_id` as the recipe API describes them. When the
/// API cannot be reached only the caller's title is kept, or "Unknown".
pub async fn describe_recipe(
    api: &dyn RecipeApi,
    recipe_id: i64,
    fallback_title: Option<&str>,
) -> NewSavedRecipe {
    match api.recipe_information(recipe_id).await {
        Ok(info) => NewSavedRecipe {
            recipe_id,
            title: Some(info.title.trim())
                .filter(|t| !t.is_empty())
                .unwrap_or(UNKNOWN_TITLE)
                .to_string(),
            image: working_image(recipe_id, info.image),
            source_url: info.source_url.filter(|s| !s.is_empty()),
        },
        Err(e) => {
            warn!(error = %e, recipe_id, "saving recipe without api details");
            NewSavedRecipe {
                recipe_id,
                title: fallback_title
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(UNKNOWN_TITLE)
                    .to_string(),
                image: None,
                source_url: None,
            }
        }
    }
}
