use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One gradable question set attached to a lesson. `lesson_name` is the
/// unique key of the quiz collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub lesson_name: String,
    #[serde(default)]
    pub lesson_data: LessonData,
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
    pub questions: Vec<Question>,
    /// Audience restriction by company code. Absent or empty means the quiz
    /// is visible to every population.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_companies: Option<Vec<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_timer_minutes() -> u32 {
    30
}

impl Quiz {
    pub fn visible_to(&self, company: &str) -> bool {
        match &self.target_companies {
            Some(targets) if !targets.is_empty() => {
                targets.iter().any(|t| t.eq_ignore_ascii_case(company))
            }
            _ => true,
        }
    }
}

/// Lesson metadata carried from the master catalog onto the quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonData {
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub sks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: u32,
}
