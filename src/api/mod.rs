mod error;

pub use error::ProxyError;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::db::{create_pool, init_database_with_pool, PlayerStore, SqliteStore};
use crate::models::ApiResponse;
use crate::services::{
    ApiFootball, ClientError, PlayerService, SearchOutcome, SourceReply, StatsSource,
    TOO_MANY_REQUESTS,
};
use crate::views::html::{render_page, Page, PageContent};
use crate::views::{
    group_into_carousels, season_options, PlayerCard, LOAD_ERROR_MESSAGE, NO_RESULTS_MESSAGE,
    NO_SEASON_MESSAGE, RATE_LIMIT_MESSAGE,
};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn StatsSource>,
    pub store: Arc<dyn PlayerStore>,
    pub config: Arc<AppConfig>,
}

pub async fn serve(config: AppConfig, port: u16) -> anyhow::Result<()> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;

    let provider = ApiFootball::new(config.provider_base_url.clone(), config.api_key.clone());
    if !provider.has_key() {
        tracing::warn!("API_FOOTBALL_KEY not set, provider calls will fail with 500");
    }

    let state = AppState {
        source: Arc::new(provider),
        store: Arc::new(SqliteStore::new(pool)),
        config: Arc::new(config),
    };
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Player stats proxy listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(health_check))
        .route("/api/player", get(search_players_handler))
        .route("/api/seasons", get(league_seasons_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Player stats proxy is running"))
}

/// Present and non-blank, trimmed.
fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 2xx → 200 with the provider body, 429 → relayed as is, anything else → 500.
fn relay(result: anyhow::Result<SourceReply>, failure: &'static str) -> Result<Response, ProxyError> {
    match result {
        Ok(reply) if reply.status == TOO_MANY_REQUESTS => {
            Ok((StatusCode::TOO_MANY_REQUESTS, Json(reply.body)).into_response())
        }
        Ok(reply) if reply.is_success() => Ok((StatusCode::OK, Json(reply.body)).into_response()),
        Ok(reply) => Err(ProxyError::Upstream {
            message: failure,
            details: format!("provider returned status {}", reply.status),
        }),
        Err(e) => Err(ProxyError::Upstream { message: failure, details: e.to_string() }),
    }
}

// GET /api/player?playerName=&season=&league=
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerQuery {
    player_name: Option<String>,
    season: Option<String>,
    league: Option<String>,
}

async fn search_players_handler(
    State(state): State<AppState>,
    Query(params): Query<PlayerQuery>,
) -> Result<Response, ProxyError> {
    let (Some(name), Some(season), Some(league)) = (
        required(params.player_name),
        required(params.season),
        required(params.league),
    ) else {
        return Err(ProxyError::BadRequest("Missing query parameters"));
    };

    relay(state.source.search_players(&name, &season, &league).await, "API request failed")
}

// GET /api/seasons?league=
#[derive(Deserialize)]
struct SeasonsQuery {
    league: Option<String>,
}

async fn league_seasons_handler(
    State(state): State<AppState>,
    Query(params): Query<SeasonsQuery>,
) -> Result<Response, ProxyError> {
    let Some(league) = required(params.league) else {
        return Err(ProxyError::BadRequest("Missing league ID"));
    };

    relay(state.source.league_seasons(&league).await, "Failed to fetch seasons")
}

// GET /?playerName=&season= (cached players, or the results of a search)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    player_name: Option<String>,
    // Kept as text so `season=` or a typo falls back to the latest season.
    season: Option<String>,
}

async fn page_handler(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Html<String> {
    let service = PlayerService::new(state.source.clone(), state.store.clone(), &state.config);

    let seasons = service.load_available_seasons().await;
    let seasons_rate_limited = matches!(seasons, Err(ClientError::RateLimited));
    let seasons = seasons.unwrap_or_default();

    let selected_season = params.season.as_deref()
        .and_then(|s| s.trim().parse::<i32>().ok())
        .or_else(|| seasons.first().copied());
    let query = params.player_name.unwrap_or_default();

    let content = match (required(Some(query.clone())), selected_season) {
        (Some(name), Some(season)) => match service.search_and_cache(&name, season).await {
            Ok(SearchOutcome::Found { players, .. }) => {
                PageContent::Cards(players.iter().map(PlayerCard::from_row).collect())
            }
            Ok(SearchOutcome::RateLimited) => PageContent::Message(RATE_LIMIT_MESSAGE),
            Ok(SearchOutcome::NoResults) => PageContent::Message(NO_RESULTS_MESSAGE),
            Ok(SearchOutcome::Skipped) => cached_content(&service).await,
            Err(_) => PageContent::Message(LOAD_ERROR_MESSAGE),
        },
        (Some(_), None) if seasons_rate_limited => PageContent::Message(RATE_LIMIT_MESSAGE),
        (Some(_), None) => PageContent::Message(NO_SEASON_MESSAGE),
        (None, _) => cached_content(&service).await,
    };

    Html(render_page(&Page {
        seasons: season_options(&seasons),
        selected_season,
        query,
        content,
    }))
}

async fn cached_content(service: &PlayerService) -> PageContent {
    match service.load_cached_players().await {
        Ok(rows) => PageContent::Carousels(group_into_carousels(&rows)),
        Err(_) => PageContent::Message(LOAD_ERROR_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::services::player_service::tests::{search_payload, FakeSource, MemoryStore};

    fn app(source: FakeSource, store: Arc<MemoryStore>) -> Router {
        create_router().with_state(AppState {
            source: Arc::new(source),
            store,
            config: Arc::new(AppConfig::default()),
        })
    }

    fn seasons_payload() -> Value {
        json!({ "response": [{ "seasons": [{ "year": 2022 }, { "year": 2023 }, { "year": 2025 }] }] })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    fn ok_app() -> Router {
        app(
            FakeSource::new(SourceReply::ok(search_payload()), SourceReply::ok(seasons_payload())),
            Arc::new(MemoryStore::default()),
        )
    }

    #[tokio::test]
    async fn search_requires_every_parameter() {
        for uri in [
            "/api/player",
            "/api/player?season=2023&league=39",
            "/api/player?playerName=saka&league=39",
            "/api/player?playerName=saka&season=2023",
            "/api/player?playerName=%20&season=2023&league=39",
        ] {
            let (status, body) = get_json(ok_app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "Missing query parameters");
        }
    }

    #[tokio::test]
    async fn seasons_require_league() {
        let (status, body) = get_json(ok_app(), "/api/seasons").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing league ID");
    }

    #[tokio::test]
    async fn search_returns_provider_body_verbatim() {
        let (status, body) = get_json(ok_app(), "/api/player?playerName=saka&season=2023&league=39").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, search_payload());
    }

    #[tokio::test]
    async fn seasons_return_provider_body_verbatim() {
        let (status, body) = get_json(ok_app(), "/api/seasons?league=39").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, seasons_payload());
    }

    #[tokio::test]
    async fn provider_429_is_passed_through() {
        let limited = json!({ "message": "Too many requests" });
        let app = app(
            FakeSource::new(SourceReply { status: 429, body: limited.clone() }, SourceReply::ok(json!({}))),
            Arc::new(MemoryStore::default()),
        );

        let (status, body) = get_json(app, "/api/player?playerName=saka&season=2023&league=39").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, limited);
    }

    #[tokio::test]
    async fn provider_failure_is_500_with_details() {
        let app = app(FakeSource::failing(), Arc::new(MemoryStore::default()));

        let (status, body) = get_json(app.clone(), "/api/player?playerName=saka&season=2023&league=39").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API request failed");
        assert_eq!(body["details"], "connection refused");

        let (status, body) = get_json(app, "/api/seasons?league=39").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch seasons");
    }

    #[tokio::test]
    async fn provider_error_status_is_500() {
        let app = app(
            FakeSource::new(SourceReply { status: 503, body: json!({}) }, SourceReply::ok(json!({}))),
            Arc::new(MemoryStore::default()),
        );
        let (status, body) = get_json(app, "/api/player?playerName=saka&season=2023&league=39").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "provider returned status 503");
    }

    #[tokio::test]
    async fn page_search_renders_cards_and_caches_rows() {
        let store = Arc::new(MemoryStore::default());
        let app = app(
            FakeSource::new(SourceReply::ok(search_payload()), SourceReply::ok(seasons_payload())),
            store.clone(),
        );

        let (status, html) = get(app, "/?playerName=saka&season=2023").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(html.matches("class=\"player-card\"").count(), 2);
        assert!(html.contains("<option value=\"2023\" selected>Season 2023-24</option>"));
        assert!(!html.contains("value=\"2025\""));
        assert_eq!(store.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn page_without_query_renders_cached_carousels() {
        let store = Arc::new(MemoryStore::default());
        store.rows.lock().unwrap().extend([
            crate::db::tests::sample_row(1460, 2022),
            crate::db::tests::sample_row(1460, 2023),
        ]);
        let app = app(
            FakeSource::new(SourceReply::ok(search_payload()), SourceReply::ok(seasons_payload())),
            store.clone(),
        );

        let (_, html) = get(app, "/").await;
        assert_eq!(html.matches("class=\"carousel-wrapper\"").count(), 1);
        assert_eq!(html.matches("class=\"carousel-slide\"").count(), 2);
        assert_eq!(*store.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn page_shows_rate_limit_warning() {
        let store = Arc::new(MemoryStore::default());
        let app = app(
            FakeSource::new(SourceReply { status: 429, body: json!({}) }, SourceReply::ok(seasons_payload())),
            store.clone(),
        );

        let (_, html) = get(app, "/?playerName=saka&season=2023").await;
        assert!(html.contains(RATE_LIMIT_MESSAGE));
        assert_eq!(*store.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn page_reports_failed_cache_load() {
        let store = Arc::new(MemoryStore { fail_load: true, ..Default::default() });
        let app = app(
            FakeSource::new(SourceReply::ok(search_payload()), SourceReply::ok(seasons_payload())),
            store,
        );

        let (status, html) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(LOAD_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn search_without_resolvable_season_shows_rate_limit() {
        let store = Arc::new(MemoryStore::default());
        store.rows.lock().unwrap().push(crate::db::tests::sample_row(1460, 2023));
        let source = Arc::new(FakeSource::new(
            SourceReply::ok(search_payload()),
            SourceReply { status: 429, body: json!({}) },
        ));
        let app = create_router().with_state(AppState {
            source: source.clone(),
            store: store.clone(),
            config: Arc::new(AppConfig::default()),
        });

        let (status, html) = get(app, "/?playerName=saka").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(RATE_LIMIT_MESSAGE));
        assert!(!html.contains("class=\"carousel-wrapper\""));
        assert_eq!(source.calls.lock().unwrap().as_slice(), ["seasons:39"]);
        assert_eq!(*store.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn search_with_empty_league_shows_no_season_message() {
        let store = Arc::new(MemoryStore::default());
        store.rows.lock().unwrap().push(crate::db::tests::sample_row(1460, 2023));
        let app = app(
            FakeSource::new(SourceReply::ok(search_payload()), SourceReply::ok(json!({ "response": [] }))),
            store.clone(),
        );

        let (_, html) = get(app, "/?playerName=saka").await;
        assert!(html.contains(NO_SEASON_MESSAGE));
        assert!(!html.contains("class=\"carousel-wrapper\""));
        assert_eq!(*store.inserts.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_season_falls_back_to_latest() {
        for uri in ["/?playerName=saka&season=", "/?playerName=saka&season=abc"] {
            let source = Arc::new(FakeSource::new(
                SourceReply::ok(search_payload()),
                SourceReply::ok(seasons_payload()),
            ));
            let app = create_router().with_state(AppState {
                source: source.clone(),
                store: Arc::new(MemoryStore::default()),
                config: Arc::new(AppConfig::default()),
            });

            let (status, html) = get(app, uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(html.matches("class=\"player-card\"").count(), 2, "{}", uri);
            assert_eq!(source.calls.lock().unwrap().as_slice(), ["seasons:39", "player:saka:2023:39"]);
        }
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn proxy_client_round_trips_through_server() {
        use crate::services::ProxyClient;

        let base = spawn(ok_app()).await;
        let client = ProxyClient::new(base);

        let reply = client.search_players("saka", "2023", "39").await.unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.body, search_payload());

        let reply = client.league_seasons("39").await.unwrap();
        assert_eq!(reply.body, seasons_payload());

        let err = client.search_players(" ", "2023", "39").await.unwrap_err();
        assert!(err.to_string().contains("Missing query parameters"));
    }

    #[tokio::test]
    async fn proxy_client_sees_relayed_429() {
        use crate::services::ProxyClient;

        let app = app(
            FakeSource::new(
                SourceReply { status: 429, body: json!({ "message": "Too many requests" }) },
                SourceReply::ok(json!({})),
            ),
            Arc::new(MemoryStore::default()),
        );
        let client = ProxyClient::new(spawn(app).await);

        let reply = client.search_players("saka", "2023", "39").await.unwrap();
        assert!(reply.is_rate_limited());
        assert_eq!(reply.body["message"], "Too many requests");
    }
}
