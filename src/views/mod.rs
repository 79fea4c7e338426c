pub mod html;

use std::collections::HashMap;

use crate::models::PlayerStatRow;
use crate::utils::{or_na, season_label, text_or};

pub const RATE_LIMIT_MESSAGE: &str = "⚠️ API limit reached. Try again later.";
pub const NO_RESULTS_MESSAGE: &str =
    "No players found. Try again or check your spelling. Or change the season";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading data.";
pub const NO_SEASON_MESSAGE: &str = "No season available. Try again later.";

/// Everything one card shows, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCard {
    pub name: String,
    pub season: String,
    pub nationality: String,
    pub photo_url: String,
    pub photo_alt: String,
    pub position: String,
    pub team: String,
    pub goals: String,
    pub assists: String,
    /// Lines inside the collapsible panel.
    pub extra: Vec<String>,
    pub cards: String,
}

impl PlayerCard {
    pub fn from_row(row: &PlayerStatRow) -> Self {
        Self {
            name: row.name.clone(),
            season: season_label(row.season),
            nationality: row.nationality.clone().unwrap_or_default(),
            photo_url: row.photo_url.clone().unwrap_or_default(),
            photo_alt: format!("{}'s photo", row.name),
            position: format!("Position: {}", text_or(row.position.as_deref(), "N/A")),
            team: format!("Team: {}", text_or(row.team.as_deref(), "Unknown")),
            goals: format!("Goals: {}", or_na(row.goals)),
            assists: format!("Assists: {}", or_na(row.assists)),
            extra: vec![
                format!("Minutes: {}", or_na(row.minutes)),
                format!("Games Played: {}", or_na(row.appearances)),
                format!("Rating: {}", or_na(row.rating.as_deref())),
                format!("Shots: {}", or_na(row.shots)),
                format!("Passes: {}", or_na(row.passes)),
                format!("Dribbles: {}", or_na(row.dribbles)),
                format!("Duels: {}", or_na(row.duels)),
            ],
            cards: format!("🟨 {}   🟥 {}", row.yellow_cards, row.red_cards),
        }
    }
}

/// Show/hide state of a card's extra-stats panel. Starts hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsToggle {
    hidden: bool,
}

impl Default for StatsToggle {
    fn default() -> Self {
        Self { hidden: true }
    }
}

impl StatsToggle {
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn label(&self) -> &'static str {
        if self.hidden { "Show More" } else { "Hide" }
    }

    /// Flip visibility and return the new button label.
    pub fn toggle(&mut self) -> &'static str {
        self.hidden = !self.hidden;
        self.label()
    }
}

/// One player's seasons, newest first, with the visible slide index.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    pub player_id: i64,
    pub slides: Vec<PlayerCard>,
    index: usize,
}

impl Carousel {
    pub fn new(player_id: i64, slides: Vec<PlayerCard>) -> Self {
        Self { player_id, slides, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&PlayerCard> {
        self.slides.get(self.index)
    }

    /// Move by `step` slides, clamped to the ends.
    pub fn shift(&mut self, step: isize) -> usize {
        let last = self.slides.len().saturating_sub(1) as isize;
        self.index = (self.index as isize + step).clamp(0, last) as usize;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.shift(-1)
    }

    pub fn next(&mut self) -> usize {
        self.shift(1)
    }

    pub fn prev_disabled(&self) -> bool {
        self.index == 0
    }

    pub fn next_disabled(&self) -> bool {
        self.index + 1 >= self.slides.len()
    }
}

/// Group cached rows per player, seasons descending. Players keep the order in
/// which they first appear.
pub fn group_into_carousels(rows: &[PlayerStatRow]) -> Vec<Carousel> {
    let mut order: Vec<i64> = Vec::new();
    let mut grouped: HashMap<i64, Vec<&PlayerStatRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.player_id)
            .or_insert_with(|| {
                order.push(row.player_id);
                Vec::new()
            })
            .push(row);
    }

    order.into_iter()
        .map(|player_id| {
            let mut seasons = grouped.remove(&player_id).unwrap_or_default();
            seasons.sort_by(|a, b| b.season.cmp(&a.season));
            Carousel::new(player_id, seasons.into_iter().map(PlayerCard::from_row).collect())
        })
        .collect()
}

/// `(value, label)` pairs for the season selector.
pub fn season_options(years: &[i32]) -> Vec<(i32, String)> {
    years.iter().map(|&year| (year, season_label(year))).collect()
}

/// Terminal rendering of one card, extra stats included when `expanded`.
pub fn render_card_text(card: &PlayerCard, expanded: bool) -> String {
    let mut out = format!(
        "{} ({})\n  {}\n  {}\n  {}\n  {} | {}\n",
        card.name, card.season, card.nationality, card.position, card.team, card.goals, card.assists
    );
    if expanded {
        for line in &card.extra {
            out.push_str(&format!("  {}\n", line));
        }
    }
    out.push_str(&format!("  {}\n", card.cards));
    out
}
