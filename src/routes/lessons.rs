use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};

use crate::dto::auth_dto::{ProgramSiswaQuery, SearchQuery};
use crate::error::Error;
use crate::services::ehc_service::EmployeeSearchResult;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_lessons(State(state): State<AppState>) -> crate::error::Result<Response> {
    let lessons = state.ehc_service.get_master_lessons().await?;
    Ok(Json(lessons).into_response())
}

/// Cohort lookup used by the quiz form to prefill program and batch.
#[axum::debug_handler]
pub async fn get_program_siswa(
    State(state): State<AppState>,
    Query(query): Query<ProgramSiswaQuery>,
) -> crate::error::Result<Response> {
    let Some(login) = query.login.filter(|l| !l.is_empty()) else {
        return Err(Error::BadRequest("Parameter login wajib diisi".to_string()));
    };
    let found = state.program_service.get_program_siswa_by_login(&login).await?;
    Ok(Json(found).into_response())
}

/// Employee search for the admin cohort form. Queries shorter than two
/// characters return nothing rather than spamming the upstream API.
#[axum::debug_handler]
pub async fn search_siswa(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> crate::error::Result<Response> {
    let q = query.q.unwrap_or_default();
    if q.trim().len() < 2 {
        return Ok(Json(Vec::<EmployeeSearchResult>::new()).into_response());
    }
    let results = state.ehc_service.search_employees(q.trim()).await;
    Ok(Json(results).into_response())
}
