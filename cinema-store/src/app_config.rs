use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// File holding the persisted bearer token
    pub token_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Payment window used until the backend settings arrive
    pub default_payment_seconds: i64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("api.base_url", "http://localhost:3022")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("storage.token_path", ".cinema/token.json")?
            .set_default("booking.default_payment_seconds", 180)?
            .add_source(config::File::from(dir.join("default")).required(false))
            // Per-environment overrides, optional
            .add_source(config::File::from(dir.join(&run_mode)).required(false))
            // Machine-local overrides, not checked in
            .add_source(config::File::from(dir.join("local")).required(false))
            // Eg.. `CINEMA__API__BASE_URL=http://api` sets `api.base_url`
            .add_source(config::Environment::with_prefix("CINEMA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
