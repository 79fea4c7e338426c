use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::db::PlayerStore;
use crate::models::{LeaguePayload, PlayerEntry, PlayerSearchPayload, PlayerStatRow, StatBlock};
use crate::services::stats_source::StatsSource;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("stats request failed: {0}")]
    Request(#[source] anyhow::Error),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("player store unavailable: {0}")]
    Store(#[source] anyhow::Error),

    #[error("provider rate limit reached")]
    RateLimited,
}

/// What a search produced, in the order the page checks for it.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Blank query; nothing was requested.
    Skipped,
    RateLimited,
    NoResults,
    Found {
        players: Vec<PlayerStatRow>,
        persisted: PersistReport,
    },
}

/// Result of writing one search's rows to the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PersistReport {
    pub attempted: usize,
    pub stored: usize,
    /// `(player_id, error message)` for every row the store rejected.
    pub failures: Vec<(i64, String)>,
}

impl PersistReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Map one provider search entry to the cached row shape. Only the first
/// statistics block is used; a missing block yields all-null stats.
pub fn normalize_entry(entry: &PlayerEntry, season: i32) -> PlayerStatRow {
    let stats = entry.statistics.as_ref()
        .and_then(|s| s.first())
        .cloned()
        .unwrap_or_default();
    let StatBlock { team, games, goals, shots, passes, dribbles, duels, cards } = stats;

    let games = games.unwrap_or_default();
    let goals = goals.unwrap_or_default();
    let cards = cards.unwrap_or_default();

    PlayerStatRow {
        player_id: entry.player.id,
        name: entry.player.name.clone(),
        nationality: entry.player.nationality.clone(),
        photo_url: entry.player.photo.clone(),
        season,
        team: team.and_then(|t| t.name).filter(|n| !n.is_empty()),
        position: games.position.filter(|p| !p.is_empty()),
        goals: goals.total,
        assists: goals.assists,
        minutes: games.minutes,
        appearances: games.appearances,
        rating: games.rating,
        shots: shots.and_then(|s| s.total),
        passes: passes.and_then(|p| p.total),
        dribbles: dribbles.and_then(|d| d.attempts),
        duels: duels.and_then(|d| d.total),
        yellow_cards: cards.yellow.unwrap_or(0),
        red_cards: cards.red.unwrap_or(0),
    }
}

/// Drop the excluded year and return the rest newest first.
pub fn selectable_seasons(years: &[i32], excluded: i32) -> Vec<i32> {
    years.iter()
        .copied()
        .filter(|year| *year != excluded)
        .rev()
        .collect()
}

/// Write every row, concurrently, and wait for all of them.
pub async fn persist_batch(store: &dyn PlayerStore, rows: &[PlayerStatRow]) -> PersistReport {
    let results = join_all(rows.iter().map(|row| store.insert(row))).await;

    let mut report = PersistReport { attempted: rows.len(), ..Default::default() };
    for (row, result) in rows.iter().zip(results) {
        match result {
            Ok(()) => report.stored += 1,
            Err(e) => {
                tracing::error!("Failed to cache player {} season {}: {}", row.player_id, row.season, e);
                report.failures.push((row.player_id, e.to_string()));
            }
        }
    }
    report
}

pub struct PlayerService {
    source: Arc<dyn StatsSource>,
    store: Arc<dyn PlayerStore>,
    league_id: u32,
    excluded_season: i32,
}

impl PlayerService {
    pub fn new(source: Arc<dyn StatsSource>, store: Arc<dyn PlayerStore>, config: &AppConfig) -> Self {
        Self {
            source,
            store,
            league_id: config.league_id,
            excluded_season: config.excluded_season,
        }
    }

    pub async fn load_cached_players(&self) -> Result<Vec<PlayerStatRow>, ClientError> {
        self.store.load_all().await.map_err(|e| {
            tracing::error!("Error loading players from DB: {}", e);
            ClientError::Store(e)
        })
    }

    pub async fn search_and_cache(&self, name: &str, season: i32) -> Result<SearchOutcome, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }

        let reply = self.source
            .search_players(name, &season.to_string(), &self.league_id.to_string())
            .await
            .map_err(|e| {
                tracing::error!("Error fetching player data: {}", e);
                ClientError::Request(e)
            })?;

        if reply.is_rate_limited() {
            tracing::warn!("Player search for '{}' hit the provider rate limit", name);
            return Ok(SearchOutcome::RateLimited);
        }

        let payload: PlayerSearchPayload = serde_json::from_value(reply.body)?;
        let entries = payload.response.unwrap_or_default();
        if entries.is_empty() {
            tracing::info!("No players found for '{}' in season {}", name, season);
            return Ok(SearchOutcome::NoResults);
        }

        let players: Vec<PlayerStatRow> = entries.iter()
            .map(|entry| normalize_entry(entry, season))
            .collect();

        let persisted = persist_batch(self.store.as_ref(), &players).await;
        tracing::info!(
            "Found {} players for '{}', cached {}/{}",
            players.len(), name, persisted.stored, persisted.attempted
        );

        Ok(SearchOutcome::Found { players, persisted })
    }

    pub async fn load_available_seasons(&self) -> Result<Vec<i32>, ClientError> {
        let reply = self.source
            .league_seasons(&self.league_id.to_string())
            .await
            .map_err(|e| {
                tracing::error!("Error fetching seasons: {}", e);
                ClientError::Request(e)
            })?;

        if reply.is_rate_limited() {
            tracing::warn!("Season list hit the provider rate limit");
            return Err(ClientError::RateLimited);
        }

        let payload: LeaguePayload = serde_json::from_value(reply.body)?;
        let years: Vec<i32> = payload.response
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|league| league.seasons)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.year)
            .collect();

        Ok(selectable_seasons(&years, self.excluded_season))
    }
}
