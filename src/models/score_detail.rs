use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of forwarding a score record to the external reporting system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Pending,
    Success,
    Failed,
}

/// The durable, reportable record of a graded attempt, enriched with the
/// organizational context the reporting system expects. Field casing follows
/// the upstream payload so stored blobs stay interchangeable with legacy
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetail {
    #[serde(rename = "Login")]
    pub login: String,
    #[serde(rename = "Batch", default)]
    pub batch: String,
    #[serde(rename = "EvaluationYearSequence", default)]
    pub evaluation_year_sequence: String,
    #[serde(rename = "NamaProgram", default)]
    pub nama_program: String,
    #[serde(rename = "Section", default)]
    pub section: String,
    #[serde(rename = "Lesson")]
    pub lesson: String,
    /// Kept as a string for parity with the upstream payload.
    #[serde(rename = "Score", default)]
    pub score: String,
    #[serde(rename = "Grade", default)]
    pub grade: String,
    /// Completion date as YYYYMMDD.
    #[serde(rename = "Date", default)]
    pub date: String,
    /// Completion time-of-day as HH:MM:SS.
    #[serde(rename = "SubmitTime", default)]
    pub submit_time: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "isASM", default)]
    pub is_asm: bool,
    #[serde(rename = "syncStatus", default, skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<SyncStatus>,
    #[serde(rename = "syncError", default, skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
    #[serde(rename = "syncDate", default, skip_serializing_if = "Option::is_none")]
    pub sync_date: Option<DateTime<Utc>>,
    /// Provenance marker set by the reconciliation pass.
    #[serde(rename = "_syncedFromAttempt", default, skip_serializing_if = "std::ops::Not::not")]
    pub synced_from_attempt: bool,
    #[serde(rename = "_syncedAt", default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl ScoreDetail {
    /// Composite-key match: login comparison is case-insensitive (logins are
    /// stored upper-cased), lesson names are exact.
    pub fn matches(&self, login: &str, lesson: &str) -> bool {
        self.login.eq_ignore_ascii_case(login) && self.lesson == lesson
    }
}
