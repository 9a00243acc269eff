use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use subtle::ConstantTimeEq;

/// Basic-auth gate for the admin surface. Credentials come from the runtime
/// configuration; the password comparison is constant-time.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(encoded) = auth_str.strip_prefix("Basic ") else {
        return unauthorized("unsupported_scheme");
    };
    let Ok(decoded) = STANDARD.decode(encoded) else {
        return unauthorized("bad_authorization");
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return unauthorized("bad_authorization");
    };
    let Some((email, password)) = credentials.split_once(':') else {
        return unauthorized("bad_authorization");
    };

    let config = crate::config::get_config();
    let email_ok = email.eq_ignore_ascii_case(&config.admin_email);
    let password_ok: bool =
        ConstantTimeEq::ct_eq(password.as_bytes(), config.admin_password.as_bytes()).into();

    if email_ok && password_ok {
        next.run(req).await
    } else {
        unauthorized("invalid_credentials")
    }
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}
