use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Login wajib diisi"))]
    pub login: String,
    #[validate(length(min = 1, message = "Password wajib diisi"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MitraLoginPayload {
    #[validate(length(min = 1, message = "Login wajib diisi"))]
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgramSiswaQuery {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
