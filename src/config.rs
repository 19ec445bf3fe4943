//! Runtime configuration.

use anyhow::Result;
use lolcal_core::client;
use serde::Deserialize;

/// Settings layered from defaults, an optional `lolcal.toml`, and
/// `LOLCAL_*` environment variables (later sources win).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: String,
    pub api_base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub sync_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .set_default("port", 8000_i64)?
            .set_default("db_path", "datastore.db")?
            .set_default("api_base_url", client::DEFAULT_BASE_URL)?
            .set_default("api_key", client::PUBLIC_API_KEY)?
            .set_default("user_agent", client::DEFAULT_USER_AGENT)?
            .set_default("sync_interval_secs", 24 * 60 * 60_i64)?
            .add_source(config::File::with_name("lolcal").required(false))
            .add_source(config::Environment::with_prefix("LOLCAL"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
