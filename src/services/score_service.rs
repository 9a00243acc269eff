use chrono::Utc;

use crate::dto::admin_dto::UpdateScoreDetailPayload;
use crate::error::{Error, Result};
use crate::models::score_detail::{ScoreDetail, SyncStatus};
use crate::store::{modify_collection, read_collection, MutateOutcome, SharedStore, SCORE_DETAILS_KEY};

/// Record store for score details, keyed by the composite (login, lesson).
/// Uniqueness of the pair is advisory: writes always go through the
/// composite key, but pre-existing duplicates in the blob are tolerated and
/// the first match wins.
#[derive(Clone)]
pub struct ScoreDetailService {
    store: SharedStore,
}

impl ScoreDetailService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<ScoreDetail>> {
        let (scores, _) =
            read_collection::<Vec<ScoreDetail>>(self.store.as_ref(), SCORE_DETAILS_KEY).await?;
        Ok(scores)
    }

    pub async fn get_by_login(&self, login: &str) -> Result<Vec<ScoreDetail>> {
        let scores = self.get_all().await?;
        Ok(scores
            .into_iter()
            .filter(|s| s.login.eq_ignore_ascii_case(login))
            .collect())
    }

    pub async fn get_by_lesson(&self, lesson: &str) -> Result<Vec<ScoreDetail>> {
        let scores = self.get_all().await?;
        Ok(scores.into_iter().filter(|s| s.lesson == lesson).collect())
    }

    /// Distinct lesson names present in the collection (sync UI dropdown).
    pub async fn lessons(&self) -> Result<Vec<String>> {
        let scores = self.get_all().await?;
        let mut lessons: Vec<String> = Vec::new();
        for score in scores {
            if !score.lesson.is_empty() && !lessons.contains(&score.lesson) {
                lessons.push(score.lesson);
            }
        }
        Ok(lessons)
    }

    /// Replace-or-append by (upper login, lesson). Login is normalized to
    /// upper case on the way in.
    pub async fn upsert(&self, mut detail: ScoreDetail) -> Result<()> {
        detail.login = detail.login.to_uppercase();
        modify_collection::<Vec<ScoreDetail>, _, _>(
            self.store.as_ref(),
            SCORE_DETAILS_KEY,
            |scores| {
                match scores
                    .iter_mut()
                    .find(|s| s.matches(&detail.login, &detail.lesson))
                {
                    Some(existing) => *existing = detail.clone(),
                    None => scores.push(detail.clone()),
                }
                Ok(MutateOutcome::Commit(()))
            },
        )
        .await
    }

    /// Merge the provided fields into the matching record, leaving the rest
    /// untouched.
    pub async fn update(&self, payload: &UpdateScoreDetailPayload) -> Result<()> {
        modify_collection::<Vec<ScoreDetail>, _, _>(
            self.store.as_ref(),
            SCORE_DETAILS_KEY,
            |scores| {
                let Some(entry) = scores
                    .iter_mut()
                    .find(|s| s.matches(&payload.login, &payload.lesson))
                else {
                    return Err(Error::NotFound("Score not found".to_string()));
                };
                if let Some(score) = &payload.score {
                    entry.score = score.clone();
                }
                if let Some(grade) = &payload.grade {
                    entry.grade = grade.clone();
                }
                if let Some(nama_program) = &payload.nama_program {
                    entry.nama_program = nama_program.clone();
                }
                if let Some(batch) = &payload.batch {
                    entry.batch = batch.clone();
                }
                if let Some(description) = &payload.description {
                    entry.description = description.clone();
                }
                Ok(MutateOutcome::Commit(()))
            },
        )
        .await
    }

    /// Record the outcome of forwarding one score to the reporting system.
    /// Touches exactly the status, error and timestamp fields.
    pub async fn update_sync_status(
        &self,
        login: &str,
        lesson: &str,
        status: SyncStatus,
        error_message: Option<String>,
    ) -> Result<()> {
        modify_collection::<Vec<ScoreDetail>, _, _>(
            self.store.as_ref(),
            SCORE_DETAILS_KEY,
            |scores| {
                let Some(entry) = scores.iter_mut().find(|s| s.matches(login, lesson)) else {
                    return Err(Error::NotFound("Score not found".to_string()));
                };
                entry.sync_status = Some(status);
                entry.sync_error = error_message.clone();
                entry.sync_date = Some(Utc::now());
                Ok(MutateOutcome::Commit(()))
            },
        )
        .await
    }

    pub async fn delete(&self, login: &str, lesson: &str) -> Result<bool> {
        modify_collection::<Vec<ScoreDetail>, _, _>(
            self.store.as_ref(),
            SCORE_DETAILS_KEY,
            |scores| {
                let before = scores.len();
                scores.retain(|s| !s.matches(login, lesson));
                if scores.len() == before {
                    Ok(MutateOutcome::Unchanged(false))
                } else {
                    Ok(MutateOutcome::Commit(true))
                }
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCollectionStore;
    use std::sync::Arc;

    fn detail(login: &str, lesson: &str, score: &str) -> ScoreDetail {
        ScoreDetail {
            login: login.to_string(),
            batch: "1".to_string(),
            evaluation_year_sequence: "1".to_string(),
            nama_program: "ODP".to_string(),
            section: "KURIKULUM INDEPENDEN".to_string(),
            lesson: lesson.to_string(),
            score: score.to_string(),
            grade: "A".to_string(),
            date: "20250601".to_string(),
            submit_time: "08:00:00".to_string(),
            description: "LULUS DENGAN BAIK".to_string(),
            company: String::new(),
            is_asm: false,
            sync_status: None,
            sync_error: None,
            sync_date: None,
            synced_from_attempt: false,
            synced_at: None,
        }
    }

    fn service() -> ScoreDetailService {
        ScoreDetailService::new(Arc::new(MemoryCollectionStore::new()))
    }

    #[tokio::test]
    async fn upsert_replaces_by_composite_key() {
        let svc = service();
        svc.upsert(detail("a@x.com", "Safety101", "80")).await.unwrap();
        svc.upsert(detail("A@X.COM", "Safety101", "90")).await.unwrap();
        svc.upsert(detail("A@X.COM", "Ethics", "70")).await.unwrap();

        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].score, "90");
        assert_eq!(all[0].login, "A@X.COM");
    }

    #[tokio::test]
    async fn update_sync_status_touches_only_sync_fields() {
        let svc = service();
        svc.upsert(detail("A@X.COM", "Safety101", "80")).await.unwrap();
        svc.update_sync_status("a@x.com", "Safety101", SyncStatus::Failed, Some("HTTP 500".into()))
            .await
            .unwrap();

        let all = svc.get_all().await.unwrap();
        assert_eq!(all[0].sync_status, Some(SyncStatus::Failed));
        assert_eq!(all[0].sync_error.as_deref(), Some("HTTP 500"));
        assert!(all[0].sync_date.is_some());
        assert_eq!(all[0].score, "80");
        assert_eq!(all[0].grade, "A");
    }

    #[tokio::test]
    async fn update_sync_status_reports_missing_entry() {
        let svc = service();
        let err = svc
            .update_sync_status("A@X.COM", "Nope", SyncStatus::Success, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_by_composite_key() {
        let svc = service();
        svc.upsert(detail("A@X.COM", "Safety101", "80")).await.unwrap();
        svc.upsert(detail("A@X.COM", "Ethics", "70")).await.unwrap();

        assert!(svc.delete("a@x.com", "Safety101").await.unwrap());
        assert!(!svc.delete("a@x.com", "Safety101").await.unwrap());
        assert_eq!(svc.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lessons_are_distinct() {
        let svc = service();
        svc.upsert(detail("A@X.COM", "Safety101", "80")).await.unwrap();
        svc.upsert(detail("B@X.COM", "Safety101", "60")).await.unwrap();
        svc.upsert(detail("A@X.COM", "Ethics", "70")).await.unwrap();

        let lessons = svc.lessons().await.unwrap();
        assert_eq!(lessons, vec!["Safety101".to_string(), "Ethics".to_string()]);
    }
}
