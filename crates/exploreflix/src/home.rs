//! Home feed: the four sections the landing view renders.
//!
//! Each section sits behind a `RequestTracker`, so calling [`HomeFeed::load`]
//! again only refetches sections that are idle or failed.

use crate::catalog::Catalog;
use shared::{ContentRecord, ContentType, RequestTracker};
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Records shown by a type filter when no trending record has that type
const CATEGORY_FALLBACK_LEN: usize = 8;
const EDITOR_PICKS_LEN: usize = 4;
const RECENTLY_ADDED_LEN: usize = 4;

/// Browse filter over the trending list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    All,
    Only(ContentType),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown category '{0}' (expected all, movie, series or anime)")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "all" {
            return Ok(Category::All);
        }
        name.parse()
            .map(Category::Only)
            .map_err(|_| ParseCategoryError(s.to_string()))
    }
}

type Section = RequestTracker<Vec<ContentRecord>>;

/// Sections of the home view
#[derive(Debug, Default)]
pub struct HomeFeed {
    trending: Section,
    movies: Section,
    anime: Section,
    series: Section,
}

impl HomeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every section that is not already loaded or loading.
    ///
    /// Sections load concurrently. A section that comes back empty is
    /// marked failed so the next call retries it.
    pub async fn load(&mut self, catalog: &Catalog) {
        let want_trending = self.trending.begin();
        let want_movies = self.movies.begin();
        let want_anime = self.anime.begin();
        let want_series = self.series.begin();

        debug!(
            trending = want_trending,
            movies = want_movies,
            anime = want_anime,
            series = want_series,
            "Loading home sections"
        );

        let (trending, movies, anime, series) = tokio::join!(
            load_if(want_trending, catalog.trending()),
            load_if(want_movies, catalog.popular_movies()),
            load_if(want_anime, catalog.trending_anime()),
            load_if(want_series, catalog.popular_series()),
        );

        settle(&mut self.trending, "trending", trending);
        settle(&mut self.movies, "movies", movies);
        settle(&mut self.anime, "anime", anime);
        settle(&mut self.series, "series", series);
    }

    pub fn trending(&self) -> &Section {
        &self.trending
    }

    pub fn movies(&self) -> &Section {
        &self.movies
    }

    pub fn anime(&self) -> &Section {
        &self.anime
    }

    pub fn series(&self) -> &Section {
        &self.series
    }

    /// Reset failed sections so the next `load` retries them
    pub fn retry_failed(&mut self) {
        for section in [
            &mut self.trending,
            &mut self.movies,
            &mut self.anime,
            &mut self.series,
        ] {
            if section.error().is_some() {
                section.reset();
            }
        }
    }

    fn trending_records(&self) -> &[ContentRecord] {
        self.trending.value().map(Vec::as_slice).unwrap_or_default()
    }

    /// Trending records of one category.
    ///
    /// A type with no matching records falls back to the head of the
    /// trending list.
    pub fn by_category(&self, category: Category) -> Vec<&ContentRecord> {
        let trending = self.trending_records();

        let content_type = match category {
            Category::All => return trending.iter().collect(),
            Category::Only(content_type) => content_type,
        };

        let matching: Vec<&ContentRecord> = trending
            .iter()
            .filter(|record| record.content_type() == content_type)
            .collect();

        if matching.is_empty() {
            return trending.iter().take(CATEGORY_FALLBACK_LEN).collect();
        }
        matching
    }

    pub fn editor_picks(&self) -> Vec<&ContentRecord> {
        self.trending_records().iter().take(EDITOR_PICKS_LEN).collect()
    }

    /// Tail of the trending list, last record first
    pub fn recently_added(&self) -> Vec<&ContentRecord> {
        let trending = self.trending_records();
        let start = trending.len().saturating_sub(RECENTLY_ADDED_LEN);
        trending[start..].iter().rev().collect()
    }
}

async fn load_if<F>(enabled: bool, load: F) -> Option<Vec<ContentRecord>>
where
    F: Future<Output = Vec<ContentRecord>>,
{
    if enabled {
        Some(load.await)
    } else {
        None
    }
}

fn settle(section: &mut Section, name: &str, result: Option<Vec<ContentRecord>>) {
    match result {
        None => {}
        Some(records) if records.is_empty() => {
            warn!(section = name, "Section came back empty");
            section.fail("nothing found");
        }
        Some(records) => {
            info!(section = name, count = records.len(), "Section loaded");
            section.complete(records);
        }
    }
}
