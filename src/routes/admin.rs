use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::dto::admin_dto::{
    AddProgramPayload, BulkImportPayload, DeleteMitraPayload, DeleteProgramPayload,
    DeleteProgramSiswaPayload, DeleteScoreDetailPayload, MitraImportRow, ProgramSiswaImportRow,
    SaveMitraPayload, SaveProgramSiswaPayload, ScoreDetailQuery, UpdateProgramSiswaPayload,
    UpdateScoreDetailPayload,
};
use crate::dto::quiz_dto::{DeleteQuizPayload, QuizQuery, SaveQuizPayload};
use crate::error::Error;
use crate::models::quiz::Quiz;
use crate::AppState;

// ---- Quizzes ----

#[utoipa::path(
    get,
    path = "/api/admin/quiz",
    responses(
        (status = 200, description = "Quiz collection, or a single quiz when ?lesson= is given"),
        (status = 404, description = "Lesson not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> crate::error::Result<Response> {
    match query.lesson.filter(|l| !l.is_empty()) {
        Some(lesson) => {
            let quiz = state
                .quiz_service
                .get_by_lesson(&lesson)
                .await?
                .ok_or_else(|| Error::NotFound("Quiz tidak ditemukan".to_string()))?;
            Ok(Json(quiz).into_response())
        }
        None => Ok(Json(state.quiz_service.get_all().await?).into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/quiz",
    responses(
        (status = 200, description = "Quiz saved"),
        (status = 400, description = "Missing lesson name or empty question set")
    )
)]
#[axum::debug_handler]
pub async fn save_quiz(
    State(state): State<AppState>,
    Json(payload): Json<SaveQuizPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let quiz = Quiz {
        lesson_name: payload.lesson_name,
        lesson_data: payload.lesson_data.unwrap_or_default(),
        timer_minutes: payload.timer_minutes.unwrap_or(30),
        start_date: payload.start_date,
        end_date: payload.end_date,
        is_active: payload.is_active.unwrap_or(true),
        questions: payload.questions,
        target_companies: payload.target_companies,
        updated_at: Some(Utc::now()),
    };
    state.quiz_service.upsert(quiz).await?;

    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Json(payload): Json<DeleteQuizPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    if !state.quiz_service.delete_by_lesson(&payload.lesson_name).await? {
        return Err(Error::NotFound("Quiz tidak ditemukan".to_string()));
    }
    Ok(Json(json!({ "success": true })).into_response())
}

// ---- Programs ----

#[axum::debug_handler]
pub async fn get_programs(State(state): State<AppState>) -> crate::error::Result<Response> {
    Ok(Json(state.program_service.get_all_programs().await?).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/program",
    responses(
        (status = 201, description = "Program created"),
        (status = 400, description = "Duplicate program name")
    )
)]
#[axum::debug_handler]
pub async fn add_program(
    State(state): State<AppState>,
    Json(payload): Json<AddProgramPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let program = state.program_service.add_program(&payload.nama_program).await?;
    Ok((StatusCode::CREATED, Json(program)).into_response())
}

#[axum::debug_handler]
pub async fn delete_program(
    State(state): State<AppState>,
    Json(payload): Json<DeleteProgramPayload>,
) -> crate::error::Result<Response> {
    if !state.program_service.delete_program(payload.id).await? {
        return Err(Error::NotFound("Program tidak ditemukan".to_string()));
    }
    Ok(Json(json!({ "success": true })).into_response())
}

// ---- Program siswa (cohort assignments) ----

#[axum::debug_handler]
pub async fn get_program_siswa(State(state): State<AppState>) -> crate::error::Result<Response> {
    Ok(Json(state.program_service.get_all_program_siswa().await?).into_response())
}

#[axum::debug_handler]
pub async fn save_program_siswa(
    State(state): State<AppState>,
    Json(payload): Json<SaveProgramSiswaPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state
        .program_service
        .save_program_siswa(
            &payload.login,
            &payload.nama_program,
            payload.batch.as_deref().unwrap_or(""),
        )
        .await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn update_program_siswa(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProgramSiswaPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state
        .program_service
        .update_program_siswa(
            &payload.login,
            payload.new_login.as_deref(),
            payload.nama_program.as_deref(),
            payload.batch.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn delete_program_siswa(
    State(state): State<AppState>,
    Json(payload): Json<DeleteProgramSiswaPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    if !state.program_service.delete_program_siswa(&payload.login).await? {
        return Err(Error::NotFound("Siswa not found".to_string()));
    }
    Ok(Json(json!({ "success": true })).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/program-siswa/import",
    responses(
        (status = 200, description = "Import report with per-row errors")
    )
)]
#[axum::debug_handler]
pub async fn import_program_siswa(
    State(state): State<AppState>,
    Json(payload): Json<BulkImportPayload<ProgramSiswaImportRow>>,
) -> crate::error::Result<Response> {
    let outcome = state
        .program_service
        .bulk_import_program_siswa(&payload.rows)
        .await?;
    Ok(Json(outcome).into_response())
}

// ---- Score details ----

#[axum::debug_handler]
pub async fn get_score_details(
    State(state): State<AppState>,
    Query(query): Query<ScoreDetailQuery>,
) -> crate::error::Result<Response> {
    let scores = match (query.login, query.lesson) {
        (Some(login), _) if !login.is_empty() => {
            state.score_service.get_by_login(&login).await?
        }
        (_, Some(lesson)) if !lesson.is_empty() => {
            state.score_service.get_by_lesson(&lesson).await?
        }
        _ => state.score_service.get_all().await?,
    };
    Ok(Json(scores).into_response())
}

#[axum::debug_handler]
pub async fn update_score_detail(
    State(state): State<AppState>,
    Json(payload): Json<UpdateScoreDetailPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state.score_service.update(&payload).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn delete_score_detail(
    State(state): State<AppState>,
    Json(payload): Json<DeleteScoreDetailPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    if !state
        .score_service
        .delete(&payload.login, &payload.lesson)
        .await?
    {
        return Err(Error::NotFound("Score not found".to_string()));
    }
    Ok(Json(json!({ "success": true })).into_response())
}

// ---- Mitra ----

#[axum::debug_handler]
pub async fn get_mitra(State(state): State<AppState>) -> crate::error::Result<Response> {
    Ok(Json(state.mitra_service.get_all().await?).into_response())
}

#[axum::debug_handler]
pub async fn save_mitra(
    State(state): State<AppState>,
    Json(payload): Json<SaveMitraPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    state.mitra_service.save(&payload).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn delete_mitra(
    State(state): State<AppState>,
    Json(payload): Json<DeleteMitraPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    if !state.mitra_service.delete(&payload.login).await? {
        return Err(Error::NotFound("Mitra tidak ditemukan".to_string()));
    }
    Ok(Json(json!({ "success": true })).into_response())
}

#[axum::debug_handler]
pub async fn import_mitra(
    State(state): State<AppState>,
    Json(payload): Json<BulkImportPayload<MitraImportRow>>,
) -> crate::error::Result<Response> {
    let outcome = state.mitra_service.bulk_import(&payload.rows).await?;
    Ok(Json(outcome).into_response())
}
