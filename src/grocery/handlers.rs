use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{group_by_category, normalize_category, parse_add_payload, CategoryUpdate, GroceryGroup};
use super::repo;
use super::repo_types::GroceryItem;
use super::services::move_purchased_to_pantry;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    pantry::repo_types::PantryItem,
    state::AppState,
    web::local_redirect_target,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/grocery", get(list_items).post(add_items))
        .route("/grocery/:id", delete(delete_item))
        .route("/grocery/:id/toggle", post(toggle_item))
        .route("/grocery/:id/category", patch(update_category))
        .route("/grocery/clear-purchased", post(clear_purchased))
        .route("/grocery/move-to-pantry", post(move_to_pantry))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<GroceryGroup>>> {
    let items = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(group_by_category(items)))
}

/// Body is parsed by hand so that malformed JSON comes back as a plain 400.
#[instrument(skip(state, body))]
pub async fn add_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> AppResult<Response> {
    let request = parse_add_payload(&body).inspect_err(|e| {
        warn!(error = %e, "rejected grocery payload");
    })?;

    let created = repo::create_many(&state.db, user_id, &request.items).await?;
    info!(%user_id, count = created.len(), "grocery items added");

    match local_redirect_target(request.next.as_deref()) {
        Some(next) => Ok(Redirect::to(next).into_response()),
        None => Ok((StatusCode::CREATED, Json(created)).into_response()),
    }
}

#[instrument(skip(state))]
pub async fn toggle_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GroceryItem>> {
    repo::toggle_purchased(&state.db, user_id, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("grocery item"))
}

#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryUpdate>,
) -> AppResult<Json<GroceryItem>> {
    let category = normalize_category(&body.category);
    repo::update_category(&state.db, user_id, id, &category)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("grocery item"))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if repo::delete(&state.db, user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("grocery item"))
    }
}

#[instrument(skip(state))]
pub async fn clear_purchased(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    let removed = repo::clear_purchased(&state.db, user_id).await?;
    Ok(Json(json!({ "removed": removed })))
}

#[instrument(skip(state))]
pub async fn move_to_pantry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<PantryItem>>> {
    Ok(Json(move_purchased_to_pantry(&state.db, user_id).await?))
}
