use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};

use crate::models::ErrorBody;

/// HTTP 429 from the provider, relayed untouched.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Status and JSON body of a player-search or league-lookup call.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReply {
    pub status: u16,
    pub body: Value,
}

impl SourceReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// API-Football also reports an exhausted quota inside a 200 body as
    /// `errors: {"requests": "..."}` or `errors: {"rateLimit": "..."}`.
    pub fn is_rate_limited(&self) -> bool {
        if self.status == TOO_MANY_REQUESTS {
            return true;
        }
        self.body
            .get("errors")
            .and_then(Value::as_object)
            .is_some_and(|errors| errors.contains_key("requests") || errors.contains_key("rateLimit"))
    }
}

/// Where player searches and season lists come from: the provider itself
/// (inside the proxy) or the proxy (from a client).
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn search_players(&self, name: &str, season: &str, league: &str) -> Result<SourceReply>;

    async fn league_seasons(&self, league: &str) -> Result<SourceReply>;
}

// ── API-Football (credentialed, server side only) ───────────────────────────

pub struct ApiFootball {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiFootball {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<SourceReply> {
        let api_key = self.api_key.as_ref()
            .ok_or_else(|| anyhow!("API_FOOTBALL_KEY not set"))?;

        let response = self.client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("x-apisports-key", api_key)
            .send().await?;

        let status = response.status();
        if status.as_u16() == TOO_MANY_REQUESTS {
            tracing::warn!("API-Football rate limit hit on {}", path);
            return Ok(SourceReply { status: TOO_MANY_REQUESTS, body: body_or_message(response).await });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("API-Football error {}: {}", status, body));
        }

        Ok(SourceReply::ok(response.json().await?))
    }
}

#[async_trait]
impl StatsSource for ApiFootball {
    async fn search_players(&self, name: &str, season: &str, league: &str) -> Result<SourceReply> {
        tracing::info!("Searching API-Football players for '{}' (season {}, league {})", name, season, league);
        self.get("/players", &[("search", name), ("season", season), ("league", league)]).await
    }

    async fn league_seasons(&self, league: &str) -> Result<SourceReply> {
        tracing::info!("Fetching API-Football seasons for league {}", league);
        self.get("/leagues", &[("id", league)]).await
    }
}

// ── Proxy client (no credential) ─────────────────────────────────────────────

pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<SourceReply> {
        let response = self.client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send().await?;

        let status = response.status().as_u16();
        if status == TOO_MANY_REQUESTS {
            return Ok(SourceReply { status, body: body_or_message(response).await });
        }

        if !response.status().is_success() {
            let envelope = response.json::<ErrorBody>().await.ok();
            return Err(match envelope {
                Some(ErrorBody { error, details: Some(details) }) => {
                    anyhow!("proxy returned {}: {} ({})", status, error, details)
                }
                Some(ErrorBody { error, details: None }) => anyhow!("proxy returned {}: {}", status, error),
                None => anyhow!("proxy returned {}", status),
            });
        }

        Ok(SourceReply { status, body: response.json().await? })
    }
}

#[async_trait]
impl StatsSource for ProxyClient {
    async fn search_players(&self, name: &str, season: &str, league: &str) -> Result<SourceReply> {
        self.get("/api/player", &[("playerName", name), ("season", season), ("league", league)]).await
    }

    async fn league_seasons(&self, league: &str) -> Result<SourceReply> {
        self.get("/api/seasons", &[("league", league)]).await
    }
}

async fn body_or_message(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        let reply = SourceReply { status: 429, body: json!({ "message": "Too many requests" }) };
        assert!(reply.is_rate_limited());
        assert!(!reply.is_success());
    }

    #[test]
    fn quota_error_inside_ok_body_is_rate_limited() {
        let reply = SourceReply::ok(json!({
            "errors": { "requests": "You have reached the request limit for the day" },
            "response": []
        }));
        assert!(reply.is_rate_limited());
    }

    #[test]
    fn empty_errors_list_is_not_rate_limited() {
        let reply = SourceReply::ok(json!({ "errors": [], "response": [] }));
        assert!(!reply.is_rate_limited());
        assert!(reply.is_success());
    }

    #[tokio::test]
    async fn provider_without_key_fails_before_sending() {
        let provider = ApiFootball::new("http://127.0.0.1:9", None);
        assert!(!provider.has_key());
        let err = provider.league_seasons("39").await.unwrap_err();
        assert!(err.to_string().contains("API_FOOTBALL_KEY"));
    }
}
