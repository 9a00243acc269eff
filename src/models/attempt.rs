use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The record of one completed submission. Stored grouped per user under
/// `attempts:{LOGIN}` as a map from lesson name to attempt; at most one
/// attempt exists per (login, lesson) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub score: u32,
    pub grade: String,
    pub grade_desc: String,
    pub correct: u32,
    pub total: u32,
    pub completed_at: DateTime<Utc>,
}

/// The per-user attempt collection. BTreeMap keeps serialization order
/// stable across read-modify-write cycles.
pub type AttemptMap = BTreeMap<String, Attempt>;
