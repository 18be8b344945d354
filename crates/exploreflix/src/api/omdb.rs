//! OMDb client (movie and series metadata).
//!
//! OMDb answers HTTP 200 even for misses and signals them with
//! `"Response":"False"`; both that and a failed request read as "nothing".

use super::gateway::RequestGateway;
use super::types::{OmdbDetail, OmdbReply, OmdbSearch, OmdbSearchHit};
use reqwest::Url;
use shared::ContentType;
use tracing::{debug, info, warn};

/// Title kinds OMDb can filter a search by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmdbKind {
    Movie,
    Series,
}

impl OmdbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OmdbKind::Movie => "movie",
            OmdbKind::Series => "series",
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            OmdbKind::Movie => ContentType::Movie,
            OmdbKind::Series => ContentType::Series,
        }
    }

    pub fn from_content_type(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Movie => Some(OmdbKind::Movie),
            ContentType::Series => Some(OmdbKind::Series),
            ContentType::Anime => None,
        }
    }
}

/// Plot length for detail lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// List views
    Short,
    /// Detail view
    Full,
}

impl PlotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotMode::Short => "short",
            PlotMode::Full => "full",
        }
    }
}

/// OMDb API client
#[derive(Clone)]
pub struct OmdbClient {
    gateway: RequestGateway,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, gateway: RequestGateway) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            gateway,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn url(&self, params: &[(&str, &str)]) -> Option<String> {
        let raw = format!("{}/", self.base_url);
        let params = params
            .iter()
            .copied()
            .chain(std::iter::once(("apikey", self.api_key.as_str())));

        match Url::parse_with_params(&raw, params) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!(url = %raw, error = %e, "Invalid OMDb URL");
                None
            }
        }
    }

    /// Search titles of one kind; hits without an IMDb id are skipped
    pub async fn search(&self, query: &str, kind: OmdbKind) -> Vec<OmdbSearchHit> {
        info!(query = %query, kind = kind.as_str(), "Searching OMDb");

        let Some(url) = self.url(&[("s", query), ("type", kind.as_str())]) else {
            return Vec::new();
        };

        let hits = match self.gateway.fetch::<OmdbReply<OmdbSearch>>(&url).await {
            Some(OmdbReply::Found(page)) => page.search,
            Some(OmdbReply::NotFound { error }) => {
                debug!(query = %query, error = ?error, "OMDb search returned no results");
                Vec::new()
            }
            None => Vec::new(),
        };

        hits.into_iter()
            .filter(|hit| hit.imdb_id.as_deref().is_some_and(|id| !id.trim().is_empty()))
            .collect()
    }

    /// Look up one title by IMDb id
    pub async fn detail(&self, imdb_id: &str, plot: PlotMode) -> Option<OmdbDetail> {
        debug!(imdb_id = %imdb_id, plot = plot.as_str(), "Fetching OMDb detail");

        let url = self.url(&[("i", imdb_id), ("plot", plot.as_str())])?;
        self.gateway
            .fetch::<OmdbReply<OmdbDetail>>(&url)
            .await
            .and_then(OmdbReply::found)
    }
}
