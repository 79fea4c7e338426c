use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://v3.football.api-sports.io";
pub const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/footy_cards.db";

/// Premier League
pub const DEFAULT_LEAGUE_ID: u32 = 39;
/// Season the provider lists before it has any data.
pub const DEFAULT_EXCLUDED_SEASON: i32 = 2025;

/// Everything the proxy, the client layer and the store need, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub provider_base_url: String,
    pub proxy_base_url: String,
    pub database_url: String,
    pub league_id: u32,
    pub excluded_season: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var("API_FOOTBALL_KEY")
            .or_else(|| var("VITE_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        let league_id = match var("LEAGUE_ID") {
            Some(v) => v.parse().context("Invalid LEAGUE_ID")?,
            None => DEFAULT_LEAGUE_ID,
        };

        let excluded_season = match var("EXCLUDED_SEASON") {
            Some(v) => v.parse().context("Invalid EXCLUDED_SEASON")?,
            None => DEFAULT_EXCLUDED_SEASON,
        };

        Ok(Self {
            api_key,
            provider_base_url: var("PROVIDER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string()),
            proxy_base_url: var("PROXY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PROXY_BASE_URL.to_string()),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            league_id,
            excluded_season,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            league_id: DEFAULT_LEAGUE_ID,
            excluded_season: DEFAULT_EXCLUDED_SEASON,
        }
    }
}
