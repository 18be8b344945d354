//! Data models shared by the catalog and its front ends.
//!
//! `ContentRecord` is the one shape every view consumes, whichever provider
//! the data came from. Records are built through [`ContentRecord::new`],
//! which rejects a blank id or title, or [`ContentRecord::placeholder`] for
//! the synthesized fallbacks. Fields are read through accessors so nothing
//! downstream can rewrite them.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Kind of content a record describes
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
    Anime,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
            ContentType::Anime => "anime",
        }
    }

    /// Build the namespaced record id for a provider identifier
    pub fn record_id(&self, external_id: &str) -> String {
        format!("{}-{}", self.as_str(), external_id)
    }

    /// Recover the content type and provider identifier from a record id
    /// such as `movie-tt0372784` or `anime-21`.
    pub fn split_record_id(record_id: &str) -> Option<(ContentType, &str)> {
        let (prefix, external_id) = record_id.split_once('-')?;
        let content_type = prefix.parse().ok()?;
        if external_id.is_empty() {
            return None;
        }
        Some((content_type, external_id))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string does not name a content type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid content type: {0}")]
pub struct ParseContentTypeError(String);

impl std::str::FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            "anime" => Ok(ContentType::Anime),
            _ => Err(ParseContentTypeError(s.to_string())),
        }
    }
}

/// Unified content record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentRecord {
    id: String,
    title: String,
    #[serde(rename = "type")]
    content_type: ContentType,
    poster: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    plot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<String>,

    // Movie and series extras
    #[serde(skip_serializing_if = "Option::is_none")]
    cast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    director: Option<String>,

    // Anime extras
    #[serde(skip_serializing_if = "Option::is_none")]
    episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    season: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    studio: Option<String>,
}

/// Drop blank strings so "absent" has a single representation
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ContentRecord {
    /// Create a record, or `None` when the id or title is blank
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentType,
        poster: impl Into<String>,
    ) -> Option<Self> {
        let id = id.into();
        let title = title.into();
        if id.trim().is_empty() || title.trim().is_empty() {
            return None;
        }

        let poster: String = poster.into();
        Some(Self::placeholder(&id, &title, content_type, &poster))
    }

    /// Create a record that must exist even when the inputs are blank.
    ///
    /// A blank id becomes `<type>-unknown` and a blank title `Untitled`.
    pub fn placeholder(id: &str, title: &str, content_type: ContentType, poster: &str) -> Self {
        let id = if id.trim().is_empty() {
            content_type.record_id("unknown")
        } else {
            id.to_string()
        };
        let title = if title.trim().is_empty() { "Untitled" } else { title };

        Self {
            id,
            title: title.to_string(),
            content_type,
            poster: poster.to_string(),
            plot: None,
            year: None,
            genre: None,
            runtime: None,
            rating: None,
            cast: None,
            director: None,
            episodes: None,
            status: None,
            season: None,
            studio: None,
        }
    }

    // Builder steps consume the record, so they only apply while it is
    // being created.

    pub fn with_plot(mut self, plot: Option<String>) -> Self {
        self.plot = non_blank(plot);
        self
    }

    pub fn with_year(mut self, year: Option<String>) -> Self {
        self.year = non_blank(year);
        self
    }

    pub fn with_genre(mut self, genre: Option<String>) -> Self {
        self.genre = non_blank(genre);
        self
    }

    pub fn with_runtime(mut self, runtime: Option<String>) -> Self {
        self.runtime = non_blank(runtime);
        self
    }

    pub fn with_rating(mut self, rating: Option<String>) -> Self {
        self.rating = non_blank(rating);
        self
    }

    pub fn with_credits(mut self, cast: Option<String>, director: Option<String>) -> Self {
        self.cast = non_blank(cast);
        self.director = non_blank(director);
        self
    }

    pub fn with_anime_details(
        mut self,
        episodes: Option<u32>,
        status: Option<String>,
        season: Option<String>,
        studio: Option<String>,
    ) -> Self {
        self.episodes = episodes;
        self.status = non_blank(status);
        self.season = non_blank(season);
        self.studio = non_blank(studio);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn poster(&self) -> &str {
        &self.poster
    }

    pub fn plot(&self) -> Option<&str> {
        self.plot.as_deref()
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    pub fn rating(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    pub fn cast(&self) -> Option<&str> {
        self.cast.as_deref()
    }

    pub fn director(&self) -> Option<&str> {
        self.director.as_deref()
    }

    pub fn episodes(&self) -> Option<u32> {
        self.episodes
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn season(&self) -> Option<&str> {
        self.season.as_deref()
    }

    pub fn studio(&self) -> Option<&str> {
        self.studio.as_deref()
    }
}

/// Ordered set of records keyed by record id.
///
/// The first record seen for an id wins; later duplicates are dropped.
#[derive(Debug, Default)]
pub struct RecordSet {
    seen: HashSet<String>,
    records: Vec<ContentRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning false if its id was already present
    pub fn insert(&mut self, record: ContentRecord) -> bool {
        if !self.seen.insert(record.id.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_vec(self) -> Vec<ContentRecord> {
        self.records
    }
}

impl Extend<ContentRecord> for RecordSet {
    fn extend<I: IntoIterator<Item = ContentRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<ContentRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = ContentRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        set.extend(iter);
        set
    }
}
