use chrono::Utc;

use crate::activity;
use crate::dto::quiz_dto::{ApiSubmission, SubmitQuizPayload, SubmitQuizResponse};
use crate::error::{Error, Result};
use crate::models::attempt::{Attempt, AttemptMap};
use crate::models::score_detail::{ScoreDetail, SyncStatus};
use crate::scoring;
use crate::services::ehc_service::{EhcService, MasterScoreSubmission};
use crate::services::program_service::ProgramService;
use crate::services::quiz_service::QuizService;
use crate::services::score_service::ScoreDetailService;
use crate::store::{attempts_key, modify_collection, read_collection, MutateOutcome, SharedStore};

/// Record store for per-user attempts plus the submission workflow itself.
/// Attempts are the one-shot ledger: a (login, lesson) pair that exists here
/// can never be graded again.
#[derive(Clone)]
pub struct AttemptService {
    store: SharedStore,
}

impl AttemptService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_user_attempts(&self, login: &str) -> Result<AttemptMap> {
        let key = attempts_key(login);
        let (attempts, _) = read_collection::<AttemptMap>(self.store.as_ref(), &key).await?;
        Ok(attempts)
    }

    pub async fn has_attempt(&self, login: &str, lesson: &str) -> Result<bool> {
        Ok(self.get_user_attempts(login).await?.contains_key(lesson))
    }

    /// First submission wins. The existence check runs inside the
    /// conditional write, so two racing submissions for the same pair
    /// cannot both land.
    pub async fn record_attempt(&self, login: &str, lesson: &str, attempt: Attempt) -> Result<()> {
        let key = attempts_key(login);
        let lesson = lesson.to_string();
        modify_collection::<AttemptMap, _, _>(self.store.as_ref(), &key, |attempts| {
            if attempts.contains_key(&lesson) {
                return Err(Error::Forbidden(
                    "Quiz sudah pernah dikerjakan".to_string(),
                ));
            }
            attempts.insert(lesson.clone(), attempt.clone());
            Ok(MutateOutcome::Commit(()))
        })
        .await
    }

    /// Grade one submission end to end: duplicate gate, activity gate,
    /// scoring, cohort enrichment, best-effort forwarding to the master
    /// API, then the durable score record and the attempt itself.
    pub async fn submit(
        &self,
        quizzes: &QuizService,
        programs: &ProgramService,
        scores: &ScoreDetailService,
        ehc: &EhcService,
        payload: &SubmitQuizPayload,
    ) -> Result<SubmitQuizResponse> {
        let login = payload.login.to_uppercase();

        if self.has_attempt(&login, &payload.lesson_name).await? {
            return Err(Error::Forbidden(
                "Quiz sudah pernah dikerjakan".to_string(),
            ));
        }

        let quiz = quizzes
            .get_by_lesson(&payload.lesson_name)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz tidak ditemukan".to_string()))?;

        let now = Utc::now();
        let gate = activity::evaluate_quiz(&quiz, now);
        if !gate.is_active() {
            return Err(Error::Forbidden(gate.message()));
        }

        let result = scoring::calculate(&quiz.questions, &payload.answers)?;

        // Cohort data is enrichment only; a failed lookup falls through to
        // the same fallbacks as a missing assignment.
        let cohort = match programs.get_program_siswa_by_login(&login).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(login = %login, error = %e, "cohort lookup failed");
                None
            }
        };

        let program = cohort
            .as_ref()
            .map(|c| c.nama_program.clone())
            .filter(|p| !p.is_empty())
            .or_else(|| {
                payload
                    .user_data
                    .as_ref()
                    .map(|u| u.nama_program_pelatihan.clone())
                    .filter(|p| !p.is_empty())
            })
            .or_else(|| Some(quiz.lesson_data.program.clone()).filter(|p| !p.is_empty()))
            .unwrap_or_else(|| "ODP".to_string());

        let batch = cohort
            .as_ref()
            .map(|c| c.batch.clone())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "1".to_string());

        let section = if quiz.lesson_data.section.is_empty() {
            "KURIKULUM INDEPENDEN".to_string()
        } else {
            quiz.lesson_data.section.clone()
        };
        let sks = if quiz.lesson_data.sks.is_empty() {
            "1".to_string()
        } else {
            quiz.lesson_data.sks.clone()
        };

        let company = payload
            .user_data
            .as_ref()
            .map(|u| u.company.clone())
            .unwrap_or_default();
        let is_asm = company == "ASM";

        let submission = MasterScoreSubmission {
            record_type: "ScoreDetail".to_string(),
            py_company: "SISWA".to_string(),
            login: login.clone(),
            lesson: quiz.lesson_name.clone(),
            score: result.score.to_string(),
            program: program.clone(),
            section: section.clone(),
            sks,
            range_score: result.grade.clone(),
            range_kkm: result.grade.clone(),
            batch: "1".to_string(),
            description: result.grade_desc.clone(),
        };

        let api_submission = match ehc.submit_score(&submission).await {
            Ok(()) => ApiSubmission {
                success: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(login = %login, lesson = %quiz.lesson_name, error = %e, "score forwarding failed");
                ApiSubmission {
                    success: false,
                    error: Some(e),
                }
            }
        };

        let detail = ScoreDetail {
            login: login.clone(),
            batch,
            evaluation_year_sequence: "1".to_string(),
            nama_program: program,
            section,
            lesson: quiz.lesson_name.clone(),
            score: result.score.to_string(),
            grade: result.grade.clone(),
            date: now.format("%Y%m%d").to_string(),
            submit_time: now.format("%H:%M:%S").to_string(),
            description: result.grade_desc.clone(),
            company,
            is_asm,
            sync_status: Some(if api_submission.success {
                SyncStatus::Success
            } else {
                SyncStatus::Failed
            }),
            sync_error: api_submission.error.clone(),
            sync_date: Some(now),
            synced_from_attempt: false,
            synced_at: None,
        };
        scores.upsert(detail).await?;

        let attempt = Attempt {
            score: result.score,
            grade: result.grade.clone(),
            grade_desc: result.grade_desc.clone(),
            correct: result.correct,
            total: result.total,
            completed_at: now,
        };
        self.record_attempt(&login, &quiz.lesson_name, attempt)
            .await?;

        Ok(SubmitQuizResponse {
            success: true,
            result,
            api_submission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCollectionStore;
    use std::sync::Arc;

    fn attempt(score: u32) -> Attempt {
        let (grade, grade_desc) = crate::scoring::grade_for(score);
        Attempt {
            score,
            grade: grade.to_string(),
            grade_desc: grade_desc.to_string(),
            correct: score / 10,
            total: 10,
            completed_at: Utc::now(),
        }
    }

    fn service() -> AttemptService {
        AttemptService::new(Arc::new(MemoryCollectionStore::new()))
    }

    #[tokio::test]
    async fn first_attempt_wins() {
        let svc = service();
        svc.record_attempt("a@x.com", "Safety101", attempt(90))
            .await
            .unwrap();

        let err = svc
            .record_attempt("A@X.COM", "Safety101", attempt(100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let attempts = svc.get_user_attempts("a@x.com").await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts["Safety101"].score, 90);
    }

    #[tokio::test]
    async fn attempts_group_per_login() {
        let svc = service();
        svc.record_attempt("a@x.com", "Safety101", attempt(80))
            .await
            .unwrap();
        svc.record_attempt("a@x.com", "Ethics", attempt(60))
            .await
            .unwrap();
        svc.record_attempt("b@x.com", "Safety101", attempt(40))
            .await
            .unwrap();

        let a = svc.get_user_attempts("A@X.COM").await.unwrap();
        assert_eq!(a.len(), 2);
        let b = svc.get_user_attempts("b@x.com").await.unwrap();
        assert_eq!(b.len(), 1);
        assert!(svc.has_attempt("a@x.com", "Ethics").await.unwrap());
        assert!(!svc.has_attempt("b@x.com", "Ethics").await.unwrap());
    }
}
