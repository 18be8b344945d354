//! Aggregation over both providers.
//!
//! Every operation fans out gateway calls, normalizes what comes back,
//! dedupes by record id and bounds the result. Nothing here returns an
//! error: a failed branch contributes no records.

use crate::api::{
    GatewayPolicy, HttpTransport, JikanClient, OmdbClient, OmdbKind, PlotMode, RateLimiter,
    RequestGateway, ReqwestTransport, TopFilter,
};
use crate::normalize::{self, ProviderRecord};
use anyhow::Result;
use futures::future::join_all;
use rand::seq::SliceRandom;
use shared::config::{CatalogConfig, RateLimitConfig};
use shared::{Config, ContentRecord, ContentType, RecordSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Aggregator over Jikan and OMDb
#[derive(Clone)]
pub struct Catalog {
    jikan: JikanClient,
    omdb: OmdbClient,
    settings: CatalogConfig,
}

fn limiter(config: &RateLimitConfig) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(config.capacity, config.refill_per_second))
}

impl Catalog {
    /// Build a catalog that talks to the real providers
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build a catalog over any transport.
    ///
    /// Each provider gets its own rate limiter; both share the transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let policy = GatewayPolicy::from(&config.gateway);

        let jikan_gateway = RequestGateway::new(
            "jikan",
            transport.clone(),
            limiter(&config.jikan.rate_limit),
            policy.clone(),
        );
        let omdb_gateway = RequestGateway::new(
            "omdb",
            transport,
            limiter(&config.omdb.rate_limit),
            policy,
        );

        Self {
            jikan: JikanClient::new(&config.jikan.base_url, jikan_gateway),
            omdb: OmdbClient::new(&config.omdb.base_url, &config.omdb.api_key, omdb_gateway),
            settings: config.catalog.clone(),
        }
    }

    pub fn settings(&self) -> &CatalogConfig {
        &self.settings
    }

    /// Top anime across the airing, popularity and favorite facets.
    ///
    /// Entries without a synopsis or poster are skipped.
    pub async fn trending_anime(&self) -> Vec<ContentRecord> {
        let limit = self.settings.anime_facet_limit;
        let pages = join_all(
            TopFilter::ALL
                .iter()
                .map(|filter| self.jikan.top_anime(*filter, limit)),
        )
        .await;

        let records: RecordSet = pages
            .into_iter()
            .flatten()
            .filter(|anime| normalize::has_synopsis_and_poster(anime))
            .filter_map(|anime| ProviderRecord::Anime(anime).normalize())
            .collect();

        info!(count = records.len(), "Collected trending anime");
        self.bounded(records)
    }

    /// Popular movies from the configured seed terms
    pub async fn popular_movies(&self) -> Vec<ContentRecord> {
        self.browse(OmdbKind::Movie, &self.settings.movie_seed_terms)
            .await
    }

    /// Popular series from the configured seed terms
    pub async fn popular_series(&self) -> Vec<ContentRecord> {
        self.browse(OmdbKind::Series, &self.settings.series_seed_terms)
            .await
    }

    pub async fn search_movies(&self, query: &str) -> Vec<ContentRecord> {
        self.search_omdb(query, OmdbKind::Movie).await
    }

    pub async fn search_series(&self, query: &str) -> Vec<ContentRecord> {
        self.search_omdb(query, OmdbKind::Series).await
    }

    pub async fn search_anime(&self, query: &str) -> Vec<ContentRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let entries = self
            .jikan
            .search_anime(query, self.settings.anime_search_limit)
            .await;

        let records: RecordSet = entries
            .into_iter()
            .filter_map(|anime| ProviderRecord::Anime(anime).normalize())
            .collect();

        debug!(query = %query, count = records.len(), "Anime search complete");
        records.into_vec()
    }

    /// Search all three content types at once.
    ///
    /// Results are ordered movies, anime, series. A blank query makes no
    /// calls.
    pub async fn search(&self, query: &str) -> Vec<ContentRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        info!(query = %query, "Searching all providers");

        let (movies, anime, series) = tokio::join!(
            self.search_movies(query),
            self.search_anime(query),
            self.search_series(query),
        );

        let records: RecordSet = movies.into_iter().chain(anime).chain(series).collect();
        info!(query = %query, count = records.len(), "Search complete");
        records.into_vec()
    }

    /// Mixed trending list of movies and anime, shuffled.
    ///
    /// Falls back to the two sample records when both providers come back
    /// empty.
    pub async fn trending(&self) -> Vec<ContentRecord> {
        let (movies, anime) = tokio::join!(self.popular_movies(), self.trending_anime());

        let mut records = movies.into_iter().chain(anime).collect::<RecordSet>().into_vec();
        if records.is_empty() {
            warn!("No trending content from any provider, using fallback set");
            return normalize::fallback_records();
        }

        records.shuffle(&mut rand::thread_rng());
        records.truncate(self.settings.max_results);
        records
    }

    /// Full record for a record id such as `movie-tt0372784` or `anime-21`.
    ///
    /// Anything that cannot be resolved yields the "Content Not Found"
    /// placeholder carrying the requested id and type.
    pub async fn content_by_id(&self, id: &str, content_type: ContentType) -> ContentRecord {
        let prefix = format!("{}-", content_type);
        let external_id = id.strip_prefix(&prefix).unwrap_or(id).trim();

        info!(id = %id, content_type = %content_type, "Fetching content details");

        let found = match content_type {
            ContentType::Movie | ContentType::Series => {
                self.omdb_detail(external_id, content_type).await
            }
            ContentType::Anime => self.anime_detail(external_id).await,
        };

        found.unwrap_or_else(|| {
            warn!(id = %id, "Content not found");
            normalize::not_found(id, content_type)
        })
    }

    async fn omdb_detail(&self, imdb_id: &str, content_type: ContentType) -> Option<ContentRecord> {
        let kind = OmdbKind::from_content_type(content_type)?;
        if imdb_id.is_empty() {
            return None;
        }

        let detail = self.omdb.detail(imdb_id, PlotMode::Full).await?;
        ProviderRecord::Omdb { kind, detail }.normalize()
    }

    async fn anime_detail(&self, external_id: &str) -> Option<ContentRecord> {
        let mal_id = match external_id.parse::<u64>() {
            Ok(mal_id) => mal_id,
            Err(_) => {
                warn!(id = %external_id, "Invalid anime id");
                return None;
            }
        };

        let anime = self.jikan.anime_full(mal_id).await?;
        ProviderRecord::Anime(anime).normalize()
    }

    /// Browse one OMDb kind by seed terms, detailing a short prefix of
    /// each term's hits
    async fn browse(&self, kind: OmdbKind, seeds: &[String]) -> Vec<ContentRecord> {
        let per_term = self.settings.detail_prefix_per_term;
        let batches = join_all(
            seeds
                .iter()
                .map(|term| self.search_with_details(term, kind, per_term)),
        )
        .await;

        let records: RecordSet = batches.into_iter().flatten().collect();
        info!(kind = kind.as_str(), count = records.len(), "Collected popular titles");
        self.bounded(records)
    }

    async fn search_omdb(&self, query: &str, kind: OmdbKind) -> Vec<ContentRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let records: RecordSet = self
            .search_with_details(query, kind, self.settings.search_detail_limit)
            .await
            .into_iter()
            .collect();
        records.into_vec()
    }

    /// OMDb search followed by detail lookups for the first `limit` hits
    async fn search_with_details(
        &self,
        query: &str,
        kind: OmdbKind,
        limit: usize,
    ) -> Vec<ContentRecord> {
        let ids: Vec<String> = self
            .omdb
            .search(query, kind)
            .await
            .into_iter()
            .filter_map(|hit| hit.imdb_id)
            .take(limit)
            .collect();

        if ids.is_empty() {
            debug!(query = %query, kind = kind.as_str(), "No OMDb hits");
            return Vec::new();
        }

        let details = join_all(ids.iter().map(|id| self.omdb.detail(id, PlotMode::Short))).await;
        let records: Vec<ContentRecord> = details
            .into_iter()
            .flatten()
            .filter_map(|detail| ProviderRecord::Omdb { kind, detail }.normalize())
            .collect();

        debug!(
            query = %query,
            kind = kind.as_str(),
            hits = ids.len(),
            kept = records.len(),
            "Detailed OMDb hits"
        );
        records
    }

    fn bounded(&self, records: RecordSet) -> Vec<ContentRecord> {
        let mut records = records.into_vec();
        records.truncate(self.settings.max_results);
        records
    }
}
