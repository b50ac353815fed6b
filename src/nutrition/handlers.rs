use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::Duration;
use tracing::instrument;

use super::dto::{DailyQuery, SummaryQuery, SummaryResponse, TodayDashboard};
use super::services::{daily_totals, day_count, load_today, resolve_range, summarize, DailyTotals};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    food_logs::repo as food_repo,
    state::AppState,
    supplements::{
        dto::{build_days, supplement_totals},
        repo as supplement_repo,
    },
    web::today_utc,
};

const MAX_DAILY_SPAN: i64 = 366;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/summary", get(summary))
        .route("/nutrition/daily", get(daily))
        .route("/nutrition/today", get(today))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> AppResult<Json<SummaryResponse>> {
    let today = today_utc();
    let (start, end) = resolve_range(q.range, q.start, q.end, today)?;
    let rows = food_repo::nutrients_in_range(&state.db, start, end).await?;
    let logs: Vec<_> = rows.into_iter().map(|r| r.nutrients).collect();
    let taken = supplement_repo::taken_between(&state.db, user_id, start, end).await?;

    Ok(Json(SummaryResponse {
        summary: summarize(&logs, &supplement_totals(&taken), start, end),
        today: load_today(&state.db, user_id, today).await?,
    }))
}

/// Today's intake with the supplement slots checked off so far.
#[instrument(skip(state))]
pub async fn today(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<TodayDashboard>> {
    let today = today_utc();
    let status = load_today(&state.db, user_id, today).await?;
    let taken = supplement_repo::taken_between(&state.db, user_id, today, today).await?;
    let slots = build_days(today, today, &taken)
        .pop()
        .map(|d| d.slots)
        .unwrap_or_default();
    Ok(Json(TodayDashboard { status, slots }))
}

#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    _: AuthUser,
    Query(q): Query<DailyQuery>,
) -> AppResult<Json<Vec<DailyTotals>>> {
    let end = q.end.unwrap_or_else(today_utc);
    let start = match q.start {
        Some(start) => start,
        None => end
            .checked_sub(Duration::days(6))
            .ok_or_else(|| AppError::BadRequest("end is out of range".into()))?,
    };
    if start > end {
        return Err(AppError::BadRequest("start must not be after end".into()));
    }
    if day_count(start, end) > MAX_DAILY_SPAN {
        return Err(AppError::BadRequest(format!(
            "range may span at most {MAX_DAILY_SPAN} days"
        )));
    }

    let rows = food_repo::nutrients_in_range(&state.db, start, end).await?;
    let logs: Vec<_> = rows.into_iter().map(|r| (r.date, r.nutrients)).collect();
    Ok(Json(daily_totals(&logs, start, end)))
}
