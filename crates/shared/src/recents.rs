//! Recent search history.
//!
//! Persists the last few search strings as a small JSON document in the data
//! directory. The list is read once on load and the whole file is rewritten
//! on every new search.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default number of searches kept
pub const DEFAULT_CAPACITY: usize = 5;

/// On-disk layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSearches {
    recent_searches: Vec<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Recent searches, most recent first
#[derive(Debug)]
pub struct RecentSearches {
    path: PathBuf,
    capacity: usize,
    entries: Vec<String>,
}

impl RecentSearches {
    /// Load the list from `path`.
    ///
    /// A missing file is an empty list. A corrupt file is logged and also
    /// treated as empty; it is replaced on the next `record`.
    pub fn load(path: impl AsRef<Path>, capacity: usize) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match Self::read(&path) {
            Ok(Some(stored)) => stored.recent_searches,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable recent searches");
                Vec::new()
            }
        };

        let mut searches = Self {
            path,
            capacity,
            entries,
        };
        searches.entries.truncate(capacity);
        searches
    }

    fn read(path: &Path) -> Result<Option<StoredSearches>> {
        if !path.exists() {
            debug!(path = %path.display(), "No recent searches yet");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recent searches: {}", path.display()))?;
        let stored = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse recent searches: {}", path.display()))?;
        Ok(Some(stored))
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Move `query` to the front of the list and persist it.
    ///
    /// Blank queries are ignored. Returns whether the list changed on disk.
    pub fn record(&mut self, query: &str) -> Result<bool> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(false);
        }

        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.capacity);

        self.save()?;
        Ok(true)
    }

    /// Remove every entry and persist the empty list
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let stored = StoredSearches {
            recent_searches: self.entries.clone(),
            updated_at: Some(Utc::now()),
        };
        let content =
            serde_json::to_string_pretty(&stored).context("Failed to serialize recent searches")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write recent searches: {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = self.entries.len(), "Recent searches saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let searches = RecentSearches::load(temp_dir.path().join("recent.json"), 5);
        assert!(searches.entries().is_empty());
    }

    #[test]
    fn test_record_orders_and_dedupes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut searches = RecentSearches::load(temp_dir.path().join("recent.json"), 5);

        searches.record("batman")?;
        searches.record("naruto")?;
        searches.record("batman")?;

        assert_eq!(searches.entries(), ["batman", "naruto"]);
        Ok(())
    }

    #[test]
    fn test_capacity_cap() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut searches = RecentSearches::load(temp_dir.path().join("recent.json"), 5);

        for query in ["a", "b", "c", "d", "e", "f"] {
            searches.record(query)?;
        }

        assert_eq!(searches.entries(), ["f", "e", "d", "c", "b"]);
        Ok(())
    }

    #[test]
    fn test_blank_query_ignored() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("recent.json");
        let mut searches = RecentSearches::load(&path, 5);

        assert!(!searches.record("   ")?);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_persists_across_loads() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("recent.json");

        let mut searches = RecentSearches::load(&path, 5);
        searches.record("  dune ")?;
        searches.record("akira")?;

        let content = std::fs::read_to_string(&path)?;
        let raw: serde_json::Value = serde_json::from_str(&content)?;
        assert_eq!(raw["recentSearches"][0], "akira");

        let reloaded = RecentSearches::load(&path, 5);
        assert_eq!(reloaded.entries(), ["akira", "dune"]);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("recent.json");
        std::fs::write(&path, "not json")?;

        let mut searches = RecentSearches::load(&path, 5);
        assert!(searches.entries().is_empty());

        searches.record("alien")?;
        assert_eq!(RecentSearches::load(&path, 5).entries(), ["alien"]);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("recent.json");
        let mut searches = RecentSearches::load(&path, 5);
        searches.record("alien")?;
        searches.clear()?;

        assert!(RecentSearches::load(&path, 5).entries().is_empty());
        Ok(())
    }
}
