//! Jikan API v4 client (anime metadata).

use super::gateway::RequestGateway;
use super::types::{JikanAnime, JikanDetailResponse, JikanListResponse};
use reqwest::Url;
use tracing::{debug, info, warn};

/// Facets of the `/top/anime` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopFilter {
    Airing,
    ByPopularity,
    Favorite,
}

impl TopFilter {
    pub const ALL: [TopFilter; 3] = [TopFilter::Airing, TopFilter::ByPopularity, TopFilter::Favorite];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopFilter::Airing => "airing",
            TopFilter::ByPopularity => "bypopularity",
            TopFilter::Favorite => "favorite",
        }
    }
}

/// Jikan API v4 client
#[derive(Clone)]
pub struct JikanClient {
    gateway: RequestGateway,
    /// Base URL for Jikan API
    base_url: String,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(base_url: impl Into<String>, gateway: RequestGateway) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { gateway, base_url }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Option<String> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };

        match parsed {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(url = %raw, error = %e, "Invalid Jikan URL");
                None
            }
        }
    }

    /// Fetch one page of top anime for a facet
    pub async fn top_anime(&self, filter: TopFilter, limit: u32) -> Vec<JikanAnime> {
        info!(filter = filter.as_str(), limit, "Fetching top anime");

        let limit = limit.to_string();
        let Some(url) = self.url("/top/anime", &[("filter", filter.as_str()), ("limit", limit.as_str())])
        else {
            return Vec::new();
        };

        let entries = self
            .gateway
            .fetch::<JikanListResponse>(&url)
            .await
            .and_then(|response| response.data)
            .unwrap_or_default();

        if entries.is_empty() {
            warn!(filter = filter.as_str(), "No anime returned for facet");
        }
        entries
    }

    /// Free-text anime search
    pub async fn search_anime(&self, query: &str, limit: u32) -> Vec<JikanAnime> {
        info!(query = %query, limit, "Searching anime");

        let limit = limit.to_string();
        let Some(url) = self.url("/anime", &[("q", query), ("limit", limit.as_str())]) else {
            return Vec::new();
        };

        self.gateway
            .fetch::<JikanListResponse>(&url)
            .await
            .and_then(|response| response.data)
            .unwrap_or_default()
    }

    /// Fetch full anime details by MAL ID
    pub async fn anime_full(&self, mal_id: u64) -> Option<JikanAnime> {
        debug!(mal_id, "Fetching anime details");

        let url = self.url(&format!("/anime/{}/full", mal_id), &[])?;
        self.gateway
            .fetch::<JikanDetailResponse>(&url)
            .await
            .and_then(|response| response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gateway::GatewayPolicy;
    use crate::api::rate_limiter::RateLimiter;
    use crate::api::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(transport: &Arc<MockTransport>) -> JikanClient {
        let gateway = RequestGateway::new(
            "jikan",
            transport.clone(),
            Arc::new(RateLimiter::new(100, 1000.0)),
            GatewayPolicy {
                max_attempts: 2,
                timeout: Duration::from_millis(200),
                retry_delay: Duration::from_millis(1),
                rate_limited_delay: Duration::from_millis(1),
            },
        );
        JikanClient::new("http://jikan.test/v4/", gateway)
    }

    #[tokio::test]
    async fn test_top_anime_url_and_payload() {
        let transport = Arc::new(MockTransport::new().json(
            "/top/anime?filter=airing&limit=4",
            json!({ "data": [{ "mal_id": 5, "title": "Frieren" }] }),
        ));
        let client = client(&transport);

        let entries = client.top_anime(TopFilter::Airing, 4).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(transport.calls(), ["http://jikan.test/v4/top/anime?filter=airing&limit=4"]);
    }

    #[tokio::test]
    async fn test_search_encodes_query() {
        let transport = Arc::new(MockTransport::new().json("/anime?q=", json!({ "data": [] })));
        let client = client(&transport);

        let entries = client.search_anime("attack on titan", 10).await;
        assert!(entries.is_empty());
        assert_eq!(
            transport.calls(),
            ["http://jikan.test/v4/anime?q=attack+on+titan&limit=10"]
        );
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let transport = Arc::new(MockTransport::new().json("/top/anime", json!({ "status": 500 })));
        let client = client(&transport);

        assert!(client.top_anime(TopFilter::Favorite, 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_anime_full() {
        let transport = Arc::new(MockTransport::new().json(
            "/anime/21/full",
            json!({ "data": { "mal_id": 21, "title": "One Piece", "episodes": null } }),
        ));
        let client = client(&transport);

        let anime = client.anime_full(21).await.unwrap();
        assert_eq!(anime.mal_id, Some(21));
        assert!(client.anime_full(22).await.is_none());
    }
}
