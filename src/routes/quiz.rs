use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use validator::Validate;

use crate::activity;
use crate::dto::quiz_dto::{
    ActiveQuizQuery, ActiveQuizSummary, AttemptsQuery, QuizQuery, StudentQuizView,
    SubmitQuizPayload,
};
use crate::error::Error;
use crate::AppState;

/// Student-facing quiz fetch. Correct-answer indices never leave the server.
#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> crate::error::Result<Response> {
    let Some(lesson) = query.lesson.filter(|l| !l.is_empty()) else {
        return Err(Error::BadRequest(
            "Parameter lesson wajib diisi".to_string(),
        ));
    };

    let quiz = state
        .quiz_service
        .get_by_lesson(&lesson)
        .await?
        .ok_or_else(|| Error::NotFound("Quiz tidak ditemukan".to_string()))?;

    let gate = activity::evaluate_quiz(&quiz, Utc::now());
    if !gate.is_active() {
        return Err(Error::Forbidden(gate.message()));
    }

    Ok(Json(StudentQuizView::from(&quiz)).into_response())
}

#[axum::debug_handler]
pub async fn get_active_quizzes(
    State(state): State<AppState>,
    Query(query): Query<ActiveQuizQuery>,
) -> crate::error::Result<Response> {
    let company = query.company.unwrap_or_default();
    let now = Utc::now();

    let quizzes = state.quiz_service.get_all().await?;
    let active: Vec<ActiveQuizSummary> = quizzes
        .iter()
        .filter(|q| activity::evaluate_quiz(q, now).is_active() && q.visible_to(&company))
        .map(ActiveQuizSummary::from)
        .collect();

    Ok(Json(active).into_response())
}

#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Json(payload): Json<SubmitQuizPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let response = state
        .attempt_service
        .submit(
            &state.quiz_service,
            &state.program_service,
            &state.score_service,
            &state.ehc_service,
            &payload,
        )
        .await?;
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn get_attempts(
    State(state): State<AppState>,
    Query(query): Query<AttemptsQuery>,
) -> crate::error::Result<Response> {
    let Some(login) = query.login.filter(|l| !l.is_empty()) else {
        return Err(Error::BadRequest("Parameter login wajib diisi".to_string()));
    };
    let attempts = state.attempt_service.get_user_attempts(&login).await?;
    Ok(Json(attempts).into_response())
}
