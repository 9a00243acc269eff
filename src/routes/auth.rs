use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, MitraLoginPayload};
use crate::error::Error;
use crate::AppState;

/// Employee login: profile lookup first (so an unknown login never hits the
/// password endpoint), then password validation.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let Some(profile) = state.ehc_service.get_employee_data(&payload.login).await? else {
        return Err(Error::Unauthorized("Login tidak ditemukan".to_string()));
    };

    if !state
        .ehc_service
        .validate_password(&payload.login, &payload.password)
        .await?
    {
        return Err(Error::Unauthorized("Password salah".to_string()));
    }

    Ok(Json(json!({ "success": true, "user": profile })).into_response())
}

/// Partner login resolves against the local mitra store; partners have no
/// upstream identity.
#[axum::debug_handler]
pub async fn mitra_login(
    State(state): State<AppState>,
    Json(payload): Json<MitraLoginPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let Some(mitra) = state.mitra_service.get(&payload.login).await? else {
        return Err(Error::NotFound("Login tidak ditemukan".to_string()));
    };

    Ok(Json(json!({ "success": true, "user": mitra })).into_response())
}
