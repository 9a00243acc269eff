use chrono::Utc;
use reqwest::Client;
use serde_json::json;

use crate::config::get_config;
use crate::dto::admin_dto::{BackfillReport, PushReport, PushRowResult};
use crate::error::{Error, Result};
use crate::models::attempt::AttemptMap;
use crate::models::program::ProgramSiswa;
use crate::models::score_detail::{ScoreDetail, SyncStatus};
use crate::services::score_service::ScoreDetailService;
use crate::store::{
    modify_collection, read_collection, MutateOutcome, SharedStore, ATTEMPTS_PREFIX,
    PROGRAM_SISWA_KEY, SCORE_DETAILS_KEY,
};

/// Reconciliation between the attempt ledger and the score collection, plus
/// the push of graded records to the external reporting endpoint.
#[derive(Clone)]
pub struct SyncService {
    store: SharedStore,
    client: Client,
}

impl SyncService {
    pub fn new(store: SharedStore, client: Client) -> Self {
        Self { store, client }
    }

    /// Walk every attempt ledger and synthesize the score records the
    /// collection is missing. Membership is re-checked inside the
    /// conditional write, so a backfill racing a live submission never
    /// duplicates a record.
    pub async fn backfill_score_details(&self) -> Result<BackfillReport> {
        let keys = self.store.list_keys(ATTEMPTS_PREFIX).await?;
        let (cohorts, _) =
            read_collection::<Vec<ProgramSiswa>>(self.store.as_ref(), PROGRAM_SISWA_KEY).await?;

        let mut candidates: Vec<ScoreDetail> = Vec::new();
        for key in keys {
            let login = key
                .strip_prefix(ATTEMPTS_PREFIX)
                .unwrap_or(&key)
                .to_uppercase();
            let (attempts, _) = read_collection::<AttemptMap>(self.store.as_ref(), &key).await?;
            let cohort = cohorts.iter().find(|c| c.login == login);

            for (lesson, attempt) in &attempts {
                candidates.push(ScoreDetail {
                    login: login.clone(),
                    batch: cohort
                        .map(|c| c.batch.clone())
                        .filter(|b| !b.is_empty())
                        .unwrap_or_else(|| "1".to_string()),
                    evaluation_year_sequence: "1".to_string(),
                    nama_program: cohort
                        .map(|c| c.nama_program.clone())
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                    section: "KURIKULUM INDEPENDEN".to_string(),
                    lesson: lesson.clone(),
                    score: attempt.score.to_string(),
                    grade: attempt.grade.clone(),
                    date: attempt.completed_at.format("%Y%m%d").to_string(),
                    submit_time: attempt.completed_at.format("%H:%M:%S").to_string(),
                    description: attempt.grade_desc.clone(),
                    company: String::new(),
                    is_asm: false,
                    sync_status: None,
                    sync_error: None,
                    sync_date: None,
                    synced_from_attempt: true,
                    synced_at: Some(Utc::now()),
                });
            }
        }

        modify_collection::<Vec<ScoreDetail>, _, _>(
            self.store.as_ref(),
            SCORE_DETAILS_KEY,
            |scores| {
                let existing = scores.len();
                let mut added = 0;
                let mut skipped = 0;
                for candidate in &candidates {
                    if scores
                        .iter()
                        .any(|s| s.matches(&candidate.login, &candidate.lesson))
                    {
                        skipped += 1;
                    } else {
                        scores.push(candidate.clone());
                        added += 1;
                    }
                }
                let report = BackfillReport {
                    existing,
                    added,
                    skipped,
                };
                if added == 0 {
                    Ok(MutateOutcome::Unchanged(report))
                } else {
                    Ok(MutateOutcome::Commit(report))
                }
            },
        )
        .await
    }

    /// Forward the given score records to the reporting endpoint, one POST
    /// per record, persisting the outcome on each record as it lands.
    pub async fn push_scores(
        &self,
        score_service: &ScoreDetailService,
        scores: &[ScoreDetail],
    ) -> Result<PushReport> {
        let config = get_config();
        let url = config
            .reporting_sync_url
            .as_deref()
            .ok_or_else(|| Error::Config("REPORTING_SYNC_URL is not set".to_string()))?;

        let mut results: Vec<PushRowResult> = Vec::with_capacity(scores.len());
        let mut synced = 0;
        let mut failed = 0;

        for score in scores {
            let outcome = self.push_one(url, score).await;
            let (success, error) = match outcome {
                Ok(()) => (true, None),
                Err(e) => (false, Some(e)),
            };

            if success {
                synced += 1;
            } else {
                failed += 1;
            }

            let status = if success {
                SyncStatus::Success
            } else {
                SyncStatus::Failed
            };
            if let Err(e) = score_service
                .update_sync_status(&score.login, &score.lesson, status, error.clone())
                .await
            {
                tracing::warn!(login = %score.login, lesson = %score.lesson, error = %e, "failed to persist sync status");
            }

            results.push(PushRowResult {
                login: score.login.clone(),
                lesson: score.lesson.clone(),
                success,
                error,
            });
        }

        Ok(PushReport {
            success: failed == 0,
            synced,
            failed,
            results,
        })
    }

    async fn push_one(&self, url: &str, score: &ScoreDetail) -> std::result::Result<(), String> {
        let config = get_config();
        let payload = json!({ "ScoreDetailList": [score] });

        let response = self
            .client
            .post(url)
            .basic_auth(
                &config.reporting_sync_username,
                Some(&config.reporting_sync_password),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }
}
