use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One player's statistics for one season, as cached in the `players` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlayerStatRow {
    pub player_id: i64,
    pub name: String,
    pub nationality: Option<String>,
    pub photo_url: Option<String>,
    pub season: i32,
    pub team: Option<String>,
    pub position: Option<String>,
    pub goals: Option<i32>,
    pub assists: Option<i32>,
    pub minutes: Option<i32>,
    pub appearances: Option<i32>,
    pub rating: Option<String>, // provider sends it as a decimal string, e.g. "7.342857"
    pub shots: Option<i32>,
    pub passes: Option<i32>,
    pub dribbles: Option<i32>,
    pub duels: Option<i32>,
    pub yellow_cards: i32,
    pub red_cards: i32,
}

// ── API-Football payloads ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PlayerSearchPayload {
    #[serde(default)]
    pub response: Option<Vec<PlayerEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEntry {
    pub player: PlayerInfo,
    #[serde(default)]
    pub statistics: Option<Vec<StatBlock>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerInfo {
    pub id: i64,
    pub name: String,
    pub nationality: Option<String>,
    pub photo: Option<String>,
}

/// One entry of `statistics[]`; every section may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub team: Option<TeamRef>,
    pub games: Option<Games>,
    pub goals: Option<Goals>,
    pub shots: Option<Totals>,
    pub passes: Option<Totals>,
    pub dribbles: Option<Dribbles>,
    pub duels: Option<Totals>,
    pub cards: Option<Cards>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Games {
    #[serde(rename = "appearences")]
    pub appearances: Option<i32>,
    pub minutes: Option<i32>,
    pub position: Option<String>,
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Goals {
    pub total: Option<i32>,
    pub assists: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub total: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dribbles {
    pub attempts: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cards {
    pub yellow: Option<i32>,
    pub red: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaguePayload {
    #[serde(default)]
    pub response: Option<Vec<LeagueEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct LeagueEntry {
    #[serde(default)]
    pub seasons: Option<Vec<SeasonEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonEntry {
    pub year: i32,
}

// API Response types

/// Body of every 400/500 the proxy produces.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}
