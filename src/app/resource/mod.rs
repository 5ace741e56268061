//! Locally cached remote files and their staleness policies
//!
//! A [`Resource`] names a remote file, where it lives locally, and when a
//! local copy stops being current. The [`ResourceManager`] applies that policy
//! against a persisted [`MarkerStore`] of last-fetch timestamps.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub mod manager;
pub mod marker;

pub use manager::{Downloader, ResourceManager};
pub use marker::{FileMarkerStore, MarkerStore, MemoryMarkerStore};

/// When a fetched copy of a resource becomes outdated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalenessPolicy {
    /// Static artifact, never refetched once present
    Never,
    /// Outdated at the first occurrence of this UTC time after the last fetch
    DailyAt(NaiveTime),
}

impl StalenessPolicy {
    /// Whether a copy fetched at `previous` is outdated at `now`
    pub fn is_outdated(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            StalenessPolicy::Never => false,
            StalenessPolicy::DailyAt(time) => {
                let mut boundary = previous.date_naive().and_time(*time).and_utc();
                if boundary <= previous {
                    boundary += Duration::days(1);
                }
                now >= boundary
            }
        }
    }
}

/// A remote file with a local name and a staleness policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub source: Url,
    /// Local file name, also the key in the marker store
    pub name: String,
    pub policy: StalenessPolicy,
}

impl Resource {
    pub fn new(source: Url, name: impl Into<String>, policy: StalenessPolicy) -> Self {
        Self {
            source,
            name: name.into(),
            policy,
        }
    }

    /// A resource that is regenerated daily at `time` (UTC)
    pub fn daily(source: Url, name: impl Into<String>, time: NaiveTime) -> Self {
        Self::new(source, name, StalenessPolicy::DailyAt(time))
    }

    /// A resource that never changes once published
    pub fn fixed(source: Url, name: impl Into<String>) -> Self {
        Self::new(source, name, StalenessPolicy::Never)
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
