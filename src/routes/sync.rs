use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::admin_dto::{PushScoresPayload, SyncScoresQuery};
use crate::AppState;

/// Without `?lesson=` this lists the distinct lessons that have scores;
/// with it, the score rows of that lesson (the sync UI drill-down).
#[axum::debug_handler]
pub async fn get_sync_scores(
    State(state): State<AppState>,
    Query(query): Query<SyncScoresQuery>,
) -> crate::error::Result<Response> {
    match query.lesson.filter(|l| !l.is_empty()) {
        Some(lesson) => Ok(Json(state.score_service.get_by_lesson(&lesson).await?).into_response()),
        None => Ok(Json(state.score_service.lessons().await?).into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/sync/scores",
    responses(
        (status = 200, description = "Per-record push report"),
        (status = 500, description = "Reporting endpoint not configured")
    )
)]
#[axum::debug_handler]
pub async fn push_scores(
    State(state): State<AppState>,
    Json(payload): Json<PushScoresPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let report = state
        .sync_service
        .push_scores(&state.score_service, &payload.scores)
        .await?;
    Ok(Json(report).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/sync/backfill",
    responses(
        (status = 200, description = "Backfill report: existing/added/skipped")
    )
)]
#[axum::debug_handler]
pub async fn backfill(State(state): State<AppState>) -> crate::error::Result<Response> {
    let report = state.sync_service.backfill_score_details().await?;
    Ok(Json(report).into_response())
}
