use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::Duration;
use tracing::{info, instrument};

use super::dto::{build_days, week_status, DayQuery, DayStatus, ToggleRequest, ToggleResponse, WeekQuery, WeekStatus};
use super::repo;
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
    web::today_utc,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/supplements", get(day))
        .route("/supplements/week", get(week))
        .route("/supplements/toggle", post(toggle))
}

#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ToggleRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let today = today_utc();
    let date = body.date.unwrap_or(today);
    if date > today {
        return Err(AppError::BadRequest("date cannot be in the future".into()));
    }
    let taken = repo::toggle(&state.db, user_id, date, body.slot).await?;
    info!(%user_id, %date, slot = body.slot.as_str(), taken, "supplement toggled");
    Ok(Json(ToggleResponse {
        date,
        slot: body.slot,
        taken,
    }))
}

#[instrument(skip(state))]
pub async fn day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<DayStatus>> {
    let date = q.date.unwrap_or_else(today_utc);
    let taken = repo::taken_between(&state.db, user_id, date, date).await?;
    let mut days = build_days(date, date, &taken);
    days.pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("empty day range")))
}

#[instrument(skip(state))]
pub async fn week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> AppResult<Json<WeekStatus>> {
    let end = q.end.unwrap_or_else(today_utc);
    let start = end
        .checked_sub(Duration::days(6))
        .ok_or_else(|| AppError::BadRequest("end is out of range".into()))?;
    let taken = repo::taken_between(&state.db, user_id, start, end).await?;
    Ok(Json(week_status(build_days(start, end, &taken))))
}
