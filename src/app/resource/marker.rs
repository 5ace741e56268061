//! Persisted last-fetch timestamps
//!
//! The marker is one flat JSON object mapping resource name to the ISO-8601
//! time of its last successful fetch. It is read and written as a whole; a
//! missing or unreadable marker counts as empty, so every resource in it is
//! treated as never fetched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::errors::{ResourceError, ResourceResult};

/// Storage for last-fetch timestamps
#[async_trait]
pub trait MarkerStore: Send {
    /// Load the stored markers, treating a missing or corrupt store as empty
    async fn load(&mut self);

    /// Last fetch time of a resource
    fn get(&self, name: &str) -> Option<DateTime<Utc>>;

    /// Record a fetch time
    fn set(&mut self, name: &str, fetched: DateTime<Utc>);

    /// Write the whole store
    async fn persist(&self) -> ResourceResult<()>;
}

/// Markers kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    path: PathBuf,
    markers: BTreeMap<String, DateTime<Utc>>,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            markers: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the marker file; an entry with an unreadable timestamp is dropped
    fn decode(text: &str) -> serde_json::Result<BTreeMap<String, DateTime<Utc>>> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| match parse_timestamp(&value) {
                Some(fetched) => Some((name, fetched)),
                None => {
                    warn!("Ignoring marker for {} with bad timestamp {:?}", name, value);
                    None
                }
            })
            .collect())
    }
}

/// RFC 3339 timestamps, or naive ISO-8601 ones read as UTC
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|fetched| fetched.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn load(&mut self) {
        self.markers = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Self::decode(&text).unwrap_or_else(|e| {
                warn!(
                    "Marker file {} is corrupt, treating as empty: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }),
            Err(e) => {
                debug!("No marker file at {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        };
    }

    fn get(&self, name: &str) -> Option<DateTime<Utc>> {
        self.markers.get(name).copied()
    }

    fn set(&mut self, name: &str, fetched: DateTime<Utc>) {
        self.markers.insert(name.to_string(), fetched);
    }

    async fn persist(&self) -> ResourceResult<()> {
        let text = serde_json::to_string_pretty(&self.markers)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ResourceError::MarkerIo {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|source| ResourceError::MarkerIo {
                path: self.path.clone(),
                source,
            })
    }
}

/// Markers kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryMarkerStore {
    markers: BTreeMap<String, DateTime<Utc>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarkerStore for MemoryMarkerStore {
    async fn load(&mut self) {}

    fn get(&self, name: &str) -> Option<DateTime<Utc>> {
        self.markers.get(name).copied()
    }

    fn set(&mut self, name: &str, fetched: DateTime<Utc>) {
        self.markers.insert(name.to_string(), fetched);
    }

    async fn persist(&self) -> ResourceResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileMarkerStore::new(temp_dir.path().join("marker.json"));
        store.load().await;
        assert_eq!(store.get("nations.xml.gz"), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("marker.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = FileMarkerStore::new(&path);
        store.load().await;
        assert_eq!(store.get("nations.xml.gz"), None);
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("marker.json");
        let fetched = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap();

        let mut store = FileMarkerStore::new(&path);
        store.set("regions.xml.gz", fetched);
        tokio_test::assert_ok!(store.persist().await);

        // The file is a flat JSON object of ISO timestamps
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["regions.xml.gz"], "2024-05-01T07:30:00Z");

        let mut reloaded = FileMarkerStore::new(&path);
        reloaded.load().await;
        assert_eq!(reloaded.get("regions.xml.gz"), Some(fetched));
    }

    // Test that persisting twice with no changes leaves the same content
    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("marker.json");
        let mut store = FileMarkerStore::new(&path);
        store.set("nations.xml.gz", Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap());

        tokio_test::assert_ok!(store.persist().await);
        let first = std::fs::read_to_string(&path).unwrap();
        tokio_test::assert_ok!(store.persist().await);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    // Test that naive timestamps are read as UTC and a bad entry only drops itself
    #[tokio::test]
    async fn test_naive_timestamps_load_as_utc() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("marker.json");
        std::fs::write(
            &path,
            r#"{"nations.xml.gz": "2024-06-01T12:00:00.123456", "regions.xml.gz": "2024-06-01T07:00:00", "cards": "yesterday"}"#,
        )
        .unwrap();

        let mut store = FileMarkerStore::new(&path);
        store.load().await;

        let nations = store.get("nations.xml.gz").unwrap();
        assert_eq!(
            nations.naive_utc(),
            NaiveDateTime::parse_from_str("2024-06-01T12:00:00.123456", "%Y-%m-%dT%H:%M:%S%.f")
                .unwrap()
        );
        assert_eq!(
            store.get("regions.xml.gz"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap())
        );
        assert_eq!(store.get("cards"), None);
    }
}
