pub mod attempt_service;
pub mod ehc_service;
pub mod mitra_service;
pub mod program_service;
pub mod quiz_service;
pub mod score_service;
pub mod sync_service;
