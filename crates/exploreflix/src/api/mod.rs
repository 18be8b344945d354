//! Provider API clients.
//!
//! This module provides rate-limited, retry-enabled clients for Jikan
//! (anime) and OMDb (movies and series), built on a shared request gateway.

pub mod gateway;
pub mod jikan;
pub mod omdb;
pub mod rate_limiter;
pub mod transport;
pub mod types;

pub use gateway::{GatewayPolicy, RequestGateway};
pub use jikan::{JikanClient, TopFilter};
pub use omdb::{OmdbClient, OmdbKind, PlotMode};
pub use rate_limiter::RateLimiter;
pub use transport::{HttpTransport, ReqwestTransport, TransportError, TransportResponse};
pub use types::*;
