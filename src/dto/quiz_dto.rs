use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::employee::EmployeeProfile;
use crate::models::quiz::{LessonData, Question, Quiz};
use crate::scoring::ScoreResult;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizPayload {
    #[validate(length(min = 1, message = "lessonName wajib diisi"))]
    pub lesson_name: String,
    pub lesson_data: Option<LessonData>,
    pub timer_minutes: Option<u32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    #[validate(length(min = 1, message = "questions wajib diisi"))]
    pub questions: Vec<Question>,
    pub target_companies: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuizPayload {
    #[validate(length(min = 1, message = "lessonName wajib diisi"))]
    pub lesson_name: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    pub lesson: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuizQuery {
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttemptsQuery {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizPayload {
    #[validate(length(min = 1, message = "lessonName wajib diisi"))]
    pub lesson_name: String,
    #[validate(length(min = 1, message = "login wajib diisi"))]
    pub login: String,
    pub answers: Vec<Option<u32>>,
    pub user_data: Option<EmployeeProfile>,
}

#[derive(Debug, Serialize)]
pub struct ApiSubmission {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub success: bool,
    pub result: ScoreResult,
    pub api_submission: ApiSubmission,
}

/// Question as exposed to students: correct-answer index stripped.
#[derive(Debug, Serialize)]
pub struct SafeQuestion {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuizView {
    pub lesson_name: String,
    pub timer_minutes: u32,
    pub question_count: usize,
    pub questions: Vec<SafeQuestion>,
}

impl From<&Quiz> for StudentQuizView {
    fn from(quiz: &Quiz) -> Self {
        let questions: Vec<SafeQuestion> = quiz
            .questions
            .iter()
            .map(|q| SafeQuestion {
                question: q.question.clone(),
                options: q.options.clone(),
            })
            .collect();
        Self {
            lesson_name: quiz.lesson_name.clone(),
            timer_minutes: quiz.timer_minutes,
            question_count: questions.len(),
            questions,
        }
    }
}

/// Dropdown entry for the active-quizzes listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveQuizSummary {
    pub nama: String,
    pub timer_minutes: u32,
    pub question_count: usize,
}

impl From<&Quiz> for ActiveQuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            nama: quiz.lesson_name.clone(),
            timer_minutes: quiz.timer_minutes,
            question_count: quiz.questions.len(),
        }
    }
}
