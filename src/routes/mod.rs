pub mod admin;
pub mod auth;
pub mod health;
pub mod lessons;
pub mod quiz;
pub mod sync;
