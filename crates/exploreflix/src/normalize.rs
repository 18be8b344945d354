//! Normalization of provider payloads into `ContentRecord`s.
//!
//! Provider shapes stop here: callers wrap a raw entry in a
//! [`ProviderRecord`] and get back either a valid record or nothing.

use crate::api::omdb::OmdbKind;
use crate::api::types::{JikanAnime, OmdbDetail};
use shared::{ContentRecord, ContentType};

/// Poster used when a provider has no image
pub const POSTER_PLACEHOLDER: &str =
    "https://via.placeholder.com/500x750/1A1A1A/FFFFFF?text=No+Image";

/// Poster for the "Content Not Found" record
pub const NOT_FOUND_POSTER: &str =
    "https://via.placeholder.com/500x750/1A1A1A/FFFFFF?text=Not+Found";

pub const NOT_FOUND_TITLE: &str = "Content Not Found";
pub const NOT_FOUND_PLOT: &str = "This content could not be loaded. Please try again later.";

/// OMDb's marker for a missing value
const OMDB_MISSING: &str = "N/A";

/// Raw provider entry, tagged by origin
#[derive(Debug, Clone)]
pub enum ProviderRecord {
    Anime(JikanAnime),
    Omdb { kind: OmdbKind, detail: OmdbDetail },
}

impl ProviderRecord {
    /// Content type the record will carry
    pub fn content_type(&self) -> ContentType {
        match self {
            ProviderRecord::Anime(_) => ContentType::Anime,
            ProviderRecord::Omdb { kind, .. } => kind.content_type(),
        }
    }

    /// Convert into a unified record, or `None` if the entry has no usable
    /// id or title
    pub fn normalize(self) -> Option<ContentRecord> {
        match self {
            ProviderRecord::Anime(anime) => normalize_anime(anime),
            ProviderRecord::Omdb { kind, detail } => normalize_omdb(kind, detail),
        }
    }
}

fn normalize_anime(anime: JikanAnime) -> Option<ContentRecord> {
    let mal_id = anime.mal_id?;
    let poster = anime.image_url().unwrap_or(POSTER_PLACEHOLDER).to_string();

    let title = anime
        .title_english
        .filter(|t| !t.trim().is_empty())
        .or(anime.title)?;

    let genre = anime
        .genres
        .iter()
        .map(|g| g.name.trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let season = match (&anime.season, anime.year) {
        (Some(season), Some(year)) => Some(format!("{} {}", season, year)),
        _ => None,
    };
    let studio = anime.studios.into_iter().next().map(|s| s.name);

    let record = ContentRecord::new(
        ContentType::Anime.record_id(&mal_id.to_string()),
        title,
        ContentType::Anime,
        poster,
    )?
    .with_plot(anime.synopsis)
    .with_year(anime.year.map(|y| y.to_string()))
    .with_genre(Some(genre))
    .with_runtime(anime.duration)
    .with_rating(anime.score.map(|s| s.to_string()))
    .with_anime_details(anime.episodes, anime.status, season, studio);

    Some(record)
}

/// OMDb field with the `N/A` marker treated as absent
fn omdb_field(value: Option<String>) -> Option<String> {
    value.filter(|v| v.trim() != OMDB_MISSING)
}

fn normalize_omdb(kind: OmdbKind, detail: OmdbDetail) -> Option<ContentRecord> {
    let content_type = kind.content_type();
    let imdb_id = omdb_field(detail.imdb_id)?;
    let title = omdb_field(detail.title)?;
    let poster = omdb_field(detail.poster)
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| POSTER_PLACEHOLDER.to_string());

    let record = ContentRecord::new(content_type.record_id(&imdb_id), title, content_type, poster)?
        .with_plot(omdb_field(detail.plot))
        .with_year(omdb_field(detail.year))
        .with_genre(omdb_field(detail.genre))
        .with_runtime(omdb_field(detail.runtime))
        .with_rating(omdb_field(detail.imdb_rating))
        .with_credits(omdb_field(detail.actors), omdb_field(detail.director));

    Some(record)
}

/// Whether an anime entry is good enough for the trending list
pub fn has_synopsis_and_poster(anime: &JikanAnime) -> bool {
    let has_synopsis = anime
        .synopsis
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    has_synopsis && anime.image_url().is_some()
}

/// Placeholder returned by a by-id lookup that found nothing
pub fn not_found(id: &str, content_type: ContentType) -> ContentRecord {
    ContentRecord::placeholder(id, NOT_FOUND_TITLE, content_type, NOT_FOUND_POSTER)
        .with_plot(Some(NOT_FOUND_PLOT.to_string()))
}

/// Records shown when no provider returned anything
pub fn fallback_records() -> Vec<ContentRecord> {
    vec![
        ContentRecord::placeholder(
            "fallback-1",
            "Sample Movie",
            ContentType::Movie,
            "https://via.placeholder.com/500x750/1A1A1A/FFFFFF?text=Sample+Movie",
        )
        .with_plot(Some("A sample movie description for demonstration purposes.".to_string()))
        .with_year(Some("2024".to_string()))
        .with_genre(Some("Action, Adventure".to_string()))
        .with_runtime(Some("120 min".to_string()))
        .with_rating(Some("8.5".to_string())),
        ContentRecord::placeholder(
            "fallback-2",
            "Sample Series",
            ContentType::Series,
            "https://via.placeholder.com/500x750/1A1A1A/FFFFFF?text=Sample+Series",
        )
        .with_plot(Some("A sample series description for demonstration purposes.".to_string()))
        .with_year(Some("2024".to_string()))
        .with_genre(Some("Drama, Thriller".to_string()))
        .with_runtime(Some("45 min".to_string()))
        .with_rating(Some("8.2".to_string())),
    ]
}
