use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::client::RecipeApiError;
use super::dto::{
    AutocompleteQuery, IngredientNutrition, IngredientNutritionQuery, RecipeDetail,
    RedirectForm, SaveRecipeRequest, SaveResponse, SaveStatus, SearchQuery, SearchResponse,
    Suggestion, DIETS,
};
use super::repo;
use super::repo_types::SavedRecipe;
use super::services::{describe_recipe, parse_ingredients, search, smart_search};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    nutrition::services::load_today,
    pantry::repo as pantry_repo,
    state::AppState,
    web::{is_ajax, local_redirect_target, today_utc, JsonOrForm},
};

pub const SAVED_RECIPES_PATH: &str = "/recipes/saved";
const AUTOCOMPLETE_MIN_CHARS: usize = 2;
const AUTOCOMPLETE_RESULTS: u32 = 8;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/search", get(search_recipes))
        .route("/recipes/saved", get(list_saved).post(save_recipe))
        .route("/recipes/saved/:recipe_id", axum::routing::delete(delete_saved))
        .route("/recipes/saved/:recipe_id/delete", post(delete_saved_form))
        .route("/recipes/:id", get(recipe_detail))
        .route("/ingredients/autocomplete", get(autocomplete))
        .route("/ingredients/:id/nutrition", get(ingredient_nutrition))
}

#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let filters = q.filters();
    let query = q.query.unwrap_or_default().trim().to_string();

    if !q.smart {
        let results = search(state.recipes.as_ref(), &query, &filters).await;
        return Ok(Json(SearchResponse {
            query,
            results,
            diet: filters.diet,
            diets: DIETS.to_vec(),
            ..Default::default()
        }));
    }

    let ingredients = match q.ingredients.as_deref().map(parse_ingredients) {
        Some(list) if !list.is_empty() => list,
        _ => pantry_repo::names_by_user(&state.db, user_id)
            .await?
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect(),
    };

    // today's lows already account for supplements taken
    let deficient = load_today(&state.db, user_id, today_utc()).await?.lows;

    let mut resp = smart_search(
        state.recipes.as_ref(),
        ingredients,
        deficient,
        filters.diet.as_deref(),
    )
    .await;
    resp.query = query;
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn recipe_detail(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<RecipeDetail>> {
    let info = state.recipes.recipe_information(id).await.map_err(|e| {
        warn!(error = %e, recipe_id = id, "recipe information unavailable");
        upstream_error(e, "recipe")
    })?;
    let saved = repo::is_saved(&state.db, user_id, id).await?;
    Ok(Json(RecipeDetail::from_information(info, saved)))
}

#[instrument(skip(state))]
pub async fn list_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<SavedRecipe>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, headers, body))]
pub async fn save_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    JsonOrForm(body): JsonOrForm<SaveRecipeRequest>,
) -> AppResult<Response> {
    let new = describe_recipe(state.recipes.as_ref(), body.recipe_id, body.title.as_deref()).await;
    let (recipe, created) = repo::save(&state.db, user_id, &new).await?;
    if created {
        info!(%user_id, recipe_id = new.recipe_id, "recipe saved");
    }

    let status = if created {
        SaveStatus::Saved
    } else {
        SaveStatus::Exists
    };
    Ok(respond(
        is_ajax(&headers),
        body.next.as_deref(),
        SaveResponse {
            status,
            recipe_id: new.recipe_id,
            recipe: Some(recipe),
        },
    ))
}

#[instrument(skip(state, headers))]
pub async fn delete_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    Path(recipe_id): Path<i64>,
) -> AppResult<Response> {
    remove_saved(&state, user_id, recipe_id, &headers, None).await
}

#[instrument(skip(state, headers, form))]
pub async fn delete_saved_form(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    Path(recipe_id): Path<i64>,
    form: Option<JsonOrForm<RedirectForm>>,
) -> AppResult<Response> {
    let next = form.and_then(|JsonOrForm(f)| f.next);
    remove_saved(&state, user_id, recipe_id, &headers, next.as_deref()).await
}

async fn remove_saved(
    state: &AppState,
    user_id: uuid::Uuid,
    recipe_id: i64,
    headers: &HeaderMap,
    next: Option<&str>,
) -> AppResult<Response> {
    let deleted = repo::delete(&state.db, user_id, recipe_id).await?;
    if deleted {
        info!(%user_id, recipe_id, "saved recipe removed");
    }
    let status = if deleted {
        SaveStatus::Deleted
    } else {
        SaveStatus::Missing
    };
    Ok(respond(
        is_ajax(headers),
        next,
        SaveResponse {
            status,
            recipe_id,
            recipe: None,
        },
    ))
}

/// XHR callers get JSON; form posts are redirected back to a page.
pub fn respond(ajax: bool, next: Option<&str>, body: SaveResponse) -> Response {
    if ajax {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        let target = local_redirect_target(next).unwrap_or(SAVED_RECIPES_PATH);
        Redirect::to(target).into_response()
    }
}

#[instrument(skip(state))]
pub async fn autocomplete(
    State(state): State<AppState>,
    _: AuthUser,
    Query(q): Query<AutocompleteQuery>,
) -> Json<Vec<Suggestion>> {
    let query = q.query.trim();
    if query.chars().count() < AUTOCOMPLETE_MIN_CHARS {
        return Json(Vec::new());
    }
    let suggestions = match state
        .recipes
        .autocomplete_ingredient(query, AUTOCOMPLETE_RESULTS)
        .await
    {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, query, "ingredient autocomplete failed");
            Vec::new()
        }
    };
    Json(
        suggestions
            .into_iter()
            .map(|s| Suggestion {
                name: s.name,
                image: s.image,
            })
            .collect(),
    )
}

#[instrument(skip(state))]
pub async fn ingredient_nutrition(
    State(state): State<AppState>,
    _: AuthUser,
    Path(id): Path<i64>,
    Query(q): Query<IngredientNutritionQuery>,
) -> AppResult<Json<IngredientNutrition>> {
    if !q.amount.is_finite() || q.amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be greater than zero".into()));
    }
    let info = state
        .recipes
        .ingredient_information(id, q.amount, &q.unit)
        .await
        .map_err(|e| {
            warn!(error = %e, ingredient_id = id, "ingredient information unavailable");
            upstream_error(e, "ingredient")
        })?;
    Ok(Json(IngredientNutrition::from_information(info, q.amount, &q.unit)))
}

fn upstream_error(e: RecipeApiError, what: &'static str) -> AppError {
    match e {
        RecipeApiError::Http { status: 404, .. } => AppError::NotFound(what),
        other => AppError::Internal(anyhow::Error::new(other).context("recipe api")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    fn body(status: SaveStatus) -> SaveResponse {
        SaveResponse {
            status,
            recipe_id: 42,
            recipe: None,
        }
    }

    #[test]
    fn ajax_gets_json() {
        let resp = respond(true, Some("/recipes/search"), body(SaveStatus::Saved));
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(LOCATION).is_none());
    }

    #[test]
    fn form_post_redirects_to_next_or_saved_list() {
        let resp = respond(false, Some("/recipes/search?query=soup"), body(SaveStatus::Saved));
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/recipes/search?query=soup");

        let resp = respond(false, Some("https://elsewhere.example"), body(SaveStatus::Deleted));
        assert_eq!(resp.headers()[LOCATION], SAVED_RECIPES_PATH);

        let resp = respond(false, None, body(SaveStatus::Missing));
        assert_eq!(resp.headers()[LOCATION], SAVED_RECIPES_PATH);
    }

    #[test]
    fn upstream_404_maps_to_not_found() {
        let err = upstream_error(
            RecipeApiError::Http {
                status: 404,
                message: String::new(),
            },
            "recipe",
        );
        assert!(matches!(err, AppError::NotFound("recipe")));
        let err = upstream_error(
            RecipeApiError::Http {
                status: 500,
                message: String::new(),
            },
            "recipe",
        );
        assert!(matches!(err, AppError::Internal(_)));
    }
}
