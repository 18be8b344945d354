//! Provider response types.
//!
//! Jikan v4 and OMDb JSON payloads, decoded leniently: nearly every field is
//! optional so one odd entry does not sink a whole page. Validation happens
//! during normalization.

use serde::{Deserialize, Serialize};

// ========== Jikan ==========

/// List response (`/top/anime`, `/anime?q=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JikanListResponse {
    #[serde(default)]
    pub data: Option<Vec<JikanAnime>>,
}

/// Single anime response (`/anime/{id}/full`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JikanDetailResponse {
    #[serde(default)]
    pub data: Option<JikanAnime>,
}

/// Anime entry; list and full responses share this shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanAnime {
    pub mal_id: Option<u64>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub synopsis: Option<String>,
    pub images: Option<JikanImages>,
    pub year: Option<u32>,
    pub genres: Vec<JikanEntity>,
    pub duration: Option<String>,
    pub score: Option<f64>,

    // Populated on the full endpoint
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub studios: Vec<JikanEntity>,
}

impl JikanAnime {
    pub fn image_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.jpg.as_ref())
            .and_then(|jpg| jpg.image_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanImages {
    pub jpg: Option<JikanImageSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanImageSet {
    pub image_url: Option<String>,
}

/// Genre or studio reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanEntity {
    pub name: String,
}

// ========== OMDb ==========

/// OMDb envelope, tagged by the `Response` field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "Response")]
pub enum OmdbReply<T> {
    #[serde(rename = "True")]
    Found(T),

    #[serde(rename = "False")]
    NotFound {
        #[serde(rename = "Error", default)]
        error: Option<String>,
    },
}

impl<T> OmdbReply<T> {
    pub fn found(self) -> Option<T> {
        match self {
            OmdbReply::Found(value) => Some(value),
            OmdbReply::NotFound { .. } => None,
        }
    }
}

/// Search result page (`?s=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmdbSearch {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchHit>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbSearchHit {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
}

/// Title detail (`?i=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbDetail {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_omdb_false_response() {
        let reply: OmdbReply<OmdbDetail> = serde_json::from_value(json!({
            "Response": "False",
            "Error": "Incorrect IMDb ID."
        }))
        .unwrap();

        match reply {
            OmdbReply::NotFound { error } => assert_eq!(error.as_deref(), Some("Incorrect IMDb ID.")),
            OmdbReply::Found(_) => panic!("expected NotFound"),
        }
    }

    #[test]
    fn test_omdb_detail_ignores_extra_fields() {
        let reply: OmdbReply<OmdbDetail> = serde_json::from_value(json!({
            "Title": "Heat",
            "Year": "1995",
            "imdbID": "tt0113277",
            "Ratings": [{ "Source": "Internet Movie Database", "Value": "8.3/10" }],
            "imdbRating": "8.3",
            "Response": "True"
        }))
        .unwrap();

        let detail = reply.found().unwrap();
        assert_eq!(detail.imdb_id.as_deref(), Some("tt0113277"));
        assert_eq!(detail.imdb_rating.as_deref(), Some("8.3"));
        assert!(detail.plot.is_none());
    }

    #[test]
    fn test_omdb_missing_response_field_is_error() {
        let result: Result<OmdbReply<OmdbSearch>, _> =
            serde_json::from_value(json!({ "Search": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_jikan_lenient_entry() {
        let list: JikanListResponse = serde_json::from_value(json!({
            "data": [
                {
                    "mal_id": 1,
                    "title": "Cowboy Bebop",
                    "images": { "jpg": { "image_url": "https://cdn/1.jpg" } },
                    "genres": [{ "mal_id": 1, "name": "Action" }],
                    "score": 8.75
                },
                { "title": "No id" }
            ],
            "pagination": { "has_next_page": true }
        }))
        .unwrap();

        let data = list.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].image_url(), Some("https://cdn/1.jpg"));
        assert_eq!(data[1].mal_id, None);
    }
}
