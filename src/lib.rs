pub mod activity;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod services;
pub mod store;

use crate::services::{
    attempt_service::AttemptService, ehc_service::EhcService, mitra_service::MitraService,
    program_service::ProgramService, quiz_service::QuizService, score_service::ScoreDetailService,
    sync_service::SyncService,
};
use crate::store::SharedStore;
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub quiz_service: QuizService,
    pub score_service: ScoreDetailService,
    pub attempt_service: AttemptService,
    pub program_service: ProgramService,
    pub mitra_service: MitraService,
    pub sync_service: SyncService,
    pub ehc_service: EhcService,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let quiz_service = QuizService::new(store.clone());
        let score_service = ScoreDetailService::new(store.clone());
        let attempt_service = AttemptService::new(store.clone());
        let program_service = ProgramService::new(store.clone());
        let mitra_service = MitraService::new(store.clone());
        let sync_service = SyncService::new(store.clone(), http_client.clone());
        let ehc_service = EhcService::new(http_client);

        Self {
            store,
            quiz_service,
            score_service,
            attempt_service,
            program_service,
            mitra_service,
            sync_service,
            ehc_service,
        }
    }
}
