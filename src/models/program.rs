use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Master catalog entry. Name is unique at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    pub nama_program: String,
}

/// Cohort assignment: which program and batch a student login belongs to.
/// One mapping per login, last write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSiswa {
    pub login: String,
    pub nama_program: String,
    #[serde(default)]
    pub batch: String,
}
