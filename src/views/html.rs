use super::{Carousel, PlayerCard, StatsToggle};
use crate::utils::escape_html;

/// Flips the panel after each "Show More" button and swaps the label.
const TOGGLE_SCRIPT: &str = "<script>\n\
document.addEventListener('click', function (event) {\n\
  var button = event.target.closest('.toggle-stats-btn');\n\
  if (!button) return;\n\
  var panel = button.nextElementSibling;\n\
  panel.hidden = !panel.hidden;\n\
  button.textContent = panel.hidden ? 'Show More' : 'Hide';\n\
});\n\
</script>\n";

/// What goes in the player container.
#[derive(Debug)]
pub enum PageContent {
    /// Cached players, one carousel each.
    Carousels(Vec<Carousel>),
    /// Fresh search results, one card each.
    Cards(Vec<PlayerCard>),
    Message(&'static str),
}

#[derive(Debug)]
pub struct Page {
    pub seasons: Vec<(i32, String)>,
    pub selected_season: Option<i32>,
    pub query: String,
    pub content: PageContent,
}

pub fn render_page(page: &Page) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Football Player Stats</title>\n</head>\n<body>\n",
    );

    html.push_str("<form class=\"search\" method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "<input id=\"search-input\" name=\"playerName\" placeholder=\"Search player\" value=\"{}\">\n",
        escape_html(&page.query)
    ));
    html.push_str("<div id=\"season-container\">");
    html.push_str(&render_season_select(&page.seasons, page.selected_season));
    html.push_str("</div>\n<button id=\"search-button\" type=\"submit\">Search</button>\n</form>\n");

    html.push_str("<div class=\"player-container\">\n");
    match &page.content {
        PageContent::Carousels(carousels) => {
            for carousel in carousels {
                html.push_str(&render_carousel(carousel));
            }
        }
        PageContent::Cards(cards) => {
            for card in cards {
                html.push_str(&render_card(card, StatsToggle::default()));
            }
        }
        PageContent::Message(message) => {
            html.push_str(&format!("<p class=\"no-results\">{}</p>\n", escape_html(message)));
        }
    }
    html.push_str("</div>\n");
    html.push_str(TOGGLE_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

pub fn render_season_select(seasons: &[(i32, String)], selected: Option<i32>) -> String {
    let mut html = String::from("<select id=\"season-select\" name=\"season\">");
    for (year, label) in seasons {
        let marker = if Some(*year) == selected { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{}\"{}>{}</option>", year, marker, escape_html(label)));
    }
    html.push_str("</select>");
    html
}

pub fn render_card(card: &PlayerCard, toggle: StatsToggle) -> String {
    let hidden = if toggle.is_hidden() { " hidden" } else { "" };
    let extra: String = card.extra.iter()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect();

    format!(
        concat!(
            "<div class=\"player-card\">\n",
            "<img class=\"player-photo\" src=\"{photo}\" alt=\"{alt}\">\n",
            "<h2 class=\"player-name\">{name}</h2>\n",
            "<p class=\"player-season\">{season}</p>\n",
            "<p class=\"player-nationality\">{nationality}</p>\n",
            "<p class=\"player-position\">{position}</p>\n",
            "<p class=\"player-team\">{team}</p>\n",
            "<p class=\"player-goals\">{goals}</p>\n",
            "<p class=\"player-assists\">{assists}</p>\n",
            "<button class=\"toggle-stats-btn\">{label}</button>\n",
            "<div class=\"player-extra-stats\"{hidden}>{extra}</div>\n",
            "<p class=\"player-cards\">{cards}</p>\n",
            "</div>\n",
        ),
        photo = escape_html(&card.photo_url),
        alt = escape_html(&card.photo_alt),
        name = escape_html(&card.name),
        season = escape_html(&card.season),
        nationality = escape_html(&card.nationality),
        position = escape_html(&card.position),
        team = escape_html(&card.team),
        goals = escape_html(&card.goals),
        assists = escape_html(&card.assists),
        label = toggle.label(),
        hidden = hidden,
        extra = extra,
        cards = escape_html(&card.cards),
    )
}

pub fn render_carousel(carousel: &Carousel) -> String {
    let mut html = format!(
        "<div class=\"carousel-wrapper\" data-player-id=\"{}\">\n<div class=\"player-carousel\">\n",
        carousel.player_id
    );
    for (idx, card) in carousel.slides.iter().enumerate() {
        let style = if idx == carousel.index() { "" } else { " style=\"display:none\"" };
        html.push_str(&format!("<div class=\"carousel-slide\"{}>\n", style));
        html.push_str(&render_card(card, StatsToggle::default()));
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n<div class=\"carousel-buttons\">");
    html.push_str(&format!(
        "<button class=\"carousel-prev\"{}>&lt;</button><button class=\"carousel-next\"{}>&gt;</button>",
        if carousel.prev_disabled() { " disabled" } else { "" },
        if carousel.next_disabled() { " disabled" } else { "" },
    ));
    html.push_str("</div>\n</div>\n");
    html
}
