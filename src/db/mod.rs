use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::str::FromStr;

use crate::models::PlayerStatRow;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database(database_url: &str) -> Result<()> {
    let pool = create_pool(database_url).await?;
    init_database_with_pool(&pool).await
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<()> {
    // One row per player per season; a repeated search refreshes the row.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id    INTEGER NOT NULL,
            name         TEXT NOT NULL,
            nationality  TEXT,
            photo_url    TEXT,
            season       INTEGER NOT NULL,
            team         TEXT,
            position     TEXT,
            goals        INTEGER,
            assists      INTEGER,
            minutes      INTEGER,
            appearances  INTEGER,
            rating       TEXT,
            shots        INTEGER,
            passes       INTEGER,
            dribbles     INTEGER,
            duels        INTEGER,
            yellow_cards INTEGER NOT NULL DEFAULT 0,
            red_cards    INTEGER NOT NULL DEFAULT 0,
            fetched_at   TEXT NOT NULL,
            UNIQUE (player_id, season)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_player_id ON players(player_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

// Player operations

pub async fn upsert_player(pool: &SqlitePool, row: &PlayerStatRow) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"INSERT INTO players
           (player_id, name, nationality, photo_url, season, team, position, goals, assists,
            minutes, appearances, rating, shots, passes, dribbles, duels, yellow_cards,
            red_cards, fetched_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(player_id, season) DO UPDATE SET
               name         = excluded.name,
               nationality  = excluded.nationality,
               photo_url    = excluded.photo_url,
               team         = excluded.team,
               position     = excluded.position,
               goals        = excluded.goals,
               assists      = excluded.assists,
               minutes      = excluded.minutes,
               appearances  = excluded.appearances,
               rating       = excluded.rating,
               shots        = excluded.shots,
               passes       = excluded.passes,
               dribbles     = excluded.dribbles,
               duels        = excluded.duels,
               yellow_cards = excluded.yellow_cards,
               red_cards    = excluded.red_cards,
               fetched_at   = excluded.fetched_at"#,
    )
    .bind(row.player_id)
    .bind(&row.name)
    .bind(&row.nationality)
    .bind(&row.photo_url)
    .bind(row.season)
    .bind(&row.team)
    .bind(&row.position)
    .bind(row.goals)
    .bind(row.assists)
    .bind(row.minutes)
    .bind(row.appearances)
    .bind(&row.rating)
    .bind(row.shots)
    .bind(row.passes)
    .bind(row.dribbles)
    .bind(row.duels)
    .bind(row.yellow_cards)
    .bind(row.red_cards)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_all_players(pool: &SqlitePool) -> Result<Vec<PlayerStatRow>> {
    let rows = sqlx::query_as::<_, PlayerStatRow>(
        r#"SELECT player_id, name, nationality, photo_url, season, team, position, goals,
                  assists, minutes, appearances, rating, shots, passes, dribbles, duels,
                  yellow_cards, red_cards
           FROM players ORDER BY id"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The cache the client layer reads on load and writes after a search.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<PlayerStatRow>>;

    async fn insert(&self, row: &PlayerStatRow) -> Result<()>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerStore for SqliteStore {
    async fn load_all(&self) -> Result<Vec<PlayerStatRow>> {
        get_all_players(&self.pool).await
    }

    async fn insert(&self, row: &PlayerStatRow) -> Result<()> {
        upsert_player(&self.pool, row).await
    }
}
