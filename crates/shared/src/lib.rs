//! Shared library for ExploreFlix.
//!
//! This crate provides the pieces every front end needs:
//! - Configuration management
//! - Logging infrastructure
//! - The unified content record
//! - Request tracking for view-owned loads
//! - Recent search history

pub mod config;
pub mod logging;
pub mod models;
pub mod recents;
pub mod tracker;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use recents::RecentSearches;
pub use tracker::{LoadState, RequestTracker};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
