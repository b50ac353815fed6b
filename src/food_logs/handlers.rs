use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{FoodLogInput, ListQuery, Page, PageWindow, PAGE_SIZE};
use super::repo;
use super::repo_types::FoodLog;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
    web::today_utc,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/food-logs", get(list_logs).post(create_log))
        .route(
            "/food-logs/:id",
            get(get_log).put(update_log).delete(delete_log),
        )
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    _: AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Page<FoodLog>>> {
    let filter = q.filter();
    let total = repo::count(&state.db, &filter).await?;
    let window = PageWindow::new(q.page, total);
    let items = repo::list(
        &state.db,
        &filter,
        q.sort(),
        i64::from(PAGE_SIZE),
        window.offset,
    )
    .await?;
    Ok(Json(Page {
        items,
        page: window.page,
        per_page: PAGE_SIZE,
        total,
        total_pages: window.total_pages,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_log(
    State(state): State<AppState>,
    _: AuthUser,
    Json(body): Json<FoodLogInput>,
) -> AppResult<(StatusCode, Json<FoodLog>)> {
    let new = body.validate(today_utc())?;
    let log = repo::create(&state.db, &new).await?;
    info!(food_log_id = %log.id, date = %log.date, "food log created");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    _: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FoodLog>> {
    repo::get(&state.db, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("food log"))
}

#[instrument(skip(state, body))]
pub async fn update_log(
    State(state): State<AppState>,
    _: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodLogInput>,
) -> AppResult<Json<FoodLog>> {
    let changes = body.validate(today_utc())?;
    let log = repo::update(&state.db, id, &changes)
        .await?
        .ok_or(AppError::NotFound("food log"))?;
    info!(food_log_id = %log.id, "food log updated");
    Ok(Json(log))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    _: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if repo::delete(&state.db, id).await? {
        info!(food_log_id = %id, "food log deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("food log"))
    }
}
