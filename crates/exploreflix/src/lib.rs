//! ExploreFlix catalog library.
//!
//! This library aggregates movie, series and anime metadata from OMDb and
//! the Jikan API v4 into one unified record shape.

pub mod api;
pub mod catalog;
pub mod home;
pub mod normalize;

pub use api::{JikanClient, OmdbClient, RateLimiter, RequestGateway};
pub use catalog::Catalog;
pub use home::{Category, HomeFeed};
pub use normalize::ProviderRecord;
