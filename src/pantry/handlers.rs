use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::PantryItemInput;
use super::repo;
use super::repo_types::{PantryItem, QuantityStep};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pantry", get(list_items).post(create_item))
        .route("/pantry/:id", put(update_item).delete(delete_item))
        .route("/pantry/:id/increment", post(increment))
        .route("/pantry/:id/decrement", post(decrement))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<PantryItem>>> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PantryItemInput>,
) -> AppResult<(StatusCode, Json<PantryItem>)> {
    let new = body.validate()?;
    let item = repo::create(&state.db, user_id, &new).await?;
    info!(pantry_item_id = %item.id, "pantry item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PantryItemInput>,
) -> AppResult<Json<PantryItem>> {
    let changes = body.validate()?;
    repo::update(&state.db, user_id, id, &changes)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("pantry item"))
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
        Err(AppError::NotFound("pantry item"))
    }
}

#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PantryItem>> {
    step(&state, user_id, id, QuantityStep::Increment).await
}

#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PantryItem>> {
    step(&state, user_id, id, QuantityStep::Decrement).await
}

async fn step(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    step: QuantityStep,
) -> AppResult<Json<PantryItem>> {
    repo::step_quantity(&state.db, user_id, id, step)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("pantry item"))
}
