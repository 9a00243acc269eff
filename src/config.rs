use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub ehc_data_url: String,
    pub ehc_data_username: String,
    pub ehc_data_password: String,
    pub ehc_valpass_url: String,
    pub ehc_pass_username: String,
    pub ehc_pass_password: String,
    pub master_siswa_url: String,
    pub master_siswa_username: String,
    pub master_siswa_password: String,
    pub reporting_sync_url: Option<String>,
    pub reporting_sync_username: String,
    pub reporting_sync_password: String,
    pub login_rpm: u32,
    pub admin_rpm: u32,
    pub api_rpm: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            admin_email: get_env("ADMIN_EMAIL")?,
            admin_password: get_env("ADMIN_PASSWORD")?,
            ehc_data_url: get_env("EHC_DATA_URL")?,
            ehc_data_username: env::var("EHC_DATA_USERNAME").unwrap_or_default(),
            ehc_data_password: env::var("EHC_DATA_PASSWORD").unwrap_or_default(),
            ehc_valpass_url: get_env("EHC_VALPASS_URL")?,
            ehc_pass_username: env::var("EHC_PASS_USERNAME").unwrap_or_default(),
            ehc_pass_password: env::var("EHC_PASS_PASSWORD").unwrap_or_default(),
            master_siswa_url: get_env("MASTER_SISWA_URL")?,
            master_siswa_username: env::var("MASTER_SISWA_USERNAME").unwrap_or_default(),
            master_siswa_password: env::var("MASTER_SISWA_PASSWORD").unwrap_or_default(),
            reporting_sync_url: env::var("REPORTING_SYNC_URL").ok(),
            reporting_sync_username: env::var("REPORTING_SYNC_USERNAME").unwrap_or_default(),
            reporting_sync_password: env::var("REPORTING_SYNC_PASSWORD").unwrap_or_default(),
            login_rpm: get_env_parse_or("LOGIN_RPM", 10)?,
            admin_rpm: get_env_parse_or("ADMIN_RPM", 20)?,
            api_rpm: get_env_parse_or("API_RPM", 100)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
