use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::score_detail::ScoreDetail;

// ---- Programs ----

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddProgramPayload {
    #[validate(length(min = 1, message = "namaProgram wajib diisi"))]
    pub nama_program: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProgramPayload {
    pub id: Uuid,
}

// ---- Program siswa (cohort assignments) ----

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgramSiswaPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    #[validate(length(min = 1, message = "namaProgram wajib diisi"))]
    pub nama_program: String,
    pub batch: Option<String>,
}

/// Partial update addressed by the current login; `new_login` renames.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgramSiswaPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    pub new_login: Option<String>,
    pub nama_program: Option<String>,
    pub batch: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteProgramSiswaPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
}

/// One spreadsheet row, already parsed client-side. Fields are optional so
/// incomplete rows surface as per-row errors instead of rejecting the batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSiswaImportRow {
    pub login: Option<String>,
    pub nama_program: Option<String>,
    pub batch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkImportPayload<Row> {
    pub rows: Vec<Row>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<RowError>,
}

// ---- Score details ----

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteScoreDetailPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    #[validate(length(min = 1, message = "lesson wajib diisi"))]
    pub lesson: String,
}

/// Field-level merge for an existing score record; absent fields are left
/// untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreDetailPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    #[validate(length(min = 1, message = "lesson wajib diisi"))]
    pub lesson: String,
    pub score: Option<String>,
    pub grade: Option<String>,
    pub nama_program: Option<String>,
    pub batch: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreDetailQuery {
    pub login: Option<String>,
    pub lesson: Option<String>,
}

// ---- Mitra ----

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveMitraPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    pub nama: Option<String>,
    pub cabang: Option<String>,
    pub divisi: Option<String>,
    pub departemen: Option<String>,
    pub nama_atasan: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteMitraPayload {
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MitraImportRow {
    pub login: Option<String>,
    pub nama: Option<String>,
    pub cabang: Option<String>,
    pub divisi: Option<String>,
    pub departemen: Option<String>,
    pub nama_atasan: Option<String>,
}

// ---- Sync ----

#[derive(Debug, Deserialize)]
pub struct SyncScoresQuery {
    pub lesson: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PushScoresPayload {
    #[validate(length(min = 1, message = "scores wajib diisi"))]
    pub scores: Vec<ScoreDetail>,
}

#[derive(Debug, Serialize)]
pub struct BackfillReport {
    pub existing: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Per-record outcome of a reporting push.
#[derive(Debug, Serialize)]
pub struct PushRowResult {
    pub login: String,
    pub lesson: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PushReport {
    pub success: bool,
    pub synced: usize,
    pub failed: usize,
    pub results: Vec<PushRowResult>,
}
