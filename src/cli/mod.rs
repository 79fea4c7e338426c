use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{create_pool, init_database_with_pool, SqliteStore};
use crate::services::{ApiFootball, ClientError, PlayerService, ProxyClient, SearchOutcome, StatsSource};
use crate::utils::season_label;
use crate::views::{
    group_into_carousels, render_card_text, season_options, PlayerCard, NO_RESULTS_MESSAGE,
    RATE_LIMIT_MESSAGE,
};

/// `direct` skips the proxy and calls API-Football with the local key.
fn stats_source(config: &AppConfig, direct: bool) -> Arc<dyn StatsSource> {
    if direct {
        Arc::new(ApiFootball::new(config.provider_base_url.clone(), config.api_key.clone()))
    } else {
        Arc::new(ProxyClient::new(config.proxy_base_url.clone()))
    }
}

async fn player_service(config: &AppConfig, direct: bool) -> Result<PlayerService> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;
    Ok(PlayerService::new(
        stats_source(config, direct),
        Arc::new(SqliteStore::new(pool)),
        config,
    ))
}

pub async fn search_player(config: &AppConfig, name: &str, season: Option<i32>, direct: bool, expanded: bool) -> Result<()> {
    let service = player_service(config, direct).await?;

    let season = match season {
        Some(season) => season,
        None => match service.load_available_seasons().await {
            Ok(years) if !years.is_empty() => years[0],
            Ok(_) => {
                println!("❌ No seasons available for league {}", config.league_id);
                return Ok(());
            }
            Err(ClientError::RateLimited) => {
                println!("{}", RATE_LIMIT_MESSAGE);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
    };

    println!("🔍 Searching for '{}' in {}...\n", name, season_label(season));

    match service.search_and_cache(name, season).await? {
        SearchOutcome::Skipped => println!("❌ Enter a player name to search"),
        SearchOutcome::RateLimited => println!("{}", RATE_LIMIT_MESSAGE),
        SearchOutcome::NoResults => println!("📭 {}", NO_RESULTS_MESSAGE),
        SearchOutcome::Found { players, persisted } => {
            for row in &players {
                println!("{}", render_card_text(&PlayerCard::from_row(row), expanded));
            }
            if persisted.is_clean() {
                println!("✅ Cached {} player rows", persisted.stored);
            } else {
                println!(
                    "⚠️  Cached {}/{} player rows ({} failed, see log)",
                    persisted.stored,
                    persisted.attempted,
                    persisted.failures.len()
                );
            }
        }
    }

    Ok(())
}

pub async fn list_players(config: &AppConfig, expanded: bool) -> Result<()> {
    let service = player_service(config, false).await?;
    let rows = service.load_cached_players().await?;

    if rows.is_empty() {
        println!("📭 No cached players yet. Try: footy-cards search --name <player>");
        return Ok(());
    }

    for carousel in group_into_carousels(&rows) {
        let seasons: Vec<&str> = carousel.slides.iter().map(|c| c.season.as_str()).collect();
        println!("📇 Player {}: {}", carousel.player_id, seasons.join(", "));
        for card in &carousel.slides {
            println!("{}", render_card_text(card, expanded));
        }
    }

    Ok(())
}

pub async fn list_seasons(config: &AppConfig, direct: bool) -> Result<()> {
    let service = player_service(config, direct).await?;
    let years = match service.load_available_seasons().await {
        Ok(years) => years,
        Err(ClientError::RateLimited) => {
            println!("{}", RATE_LIMIT_MESSAGE);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if years.is_empty() {
        println!("📭 No seasons returned for league {}", config.league_id);
        return Ok(());
    }

    println!("🏆 Seasons for league {}:\n", config.league_id);
    for (year, label) in season_options(&years) {
        println!("   • {} ({})", label, year);
    }

    Ok(())
}
