//! Daily data dumps and card lists as lazy record sequences
//!
//! The current nations and regions dumps are regenerated once a day and are
//! refetched when stale. Archived dumps for a given date and the per-season
//! card lists never change and are only downloaded when missing. Every
//! sequence streams the local gzip file through the [`StreamingDecoder`], so
//! only one record is held in memory at a time.

use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, Span};
use url::Url;

use crate::app::client::config::parse_url;
use crate::app::client::ClientConfig;
use crate::app::models::{CardSnapshot, NationSnapshot, RegionSnapshot};
use crate::app::resource::{
    Clock, Downloader, FileMarkerStore, MarkerStore, Resource, ResourceManager, SystemClock,
};
use crate::app::xml::{StreamingDecoder, TagFilter, XmlElement};
use crate::constants::dumps;
use crate::errors::{ApiResult, DecodeResult, ResourceError, ResourceResult};

/// Where dumps are kept and when they are regenerated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Directory holding downloaded dumps
    pub directory: PathBuf,
    /// Marker store path; defaults to the marker file inside `directory`
    pub marker_file: Option<PathBuf>,
    /// Time of day (UTC) the daily dumps are regenerated
    pub generation_time: NaiveTime,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            marker_file: None,
            generation_time: generation_time(),
        }
    }
}

impl DumpConfig {
    pub fn marker_path(&self) -> PathBuf {
        self.marker_file
            .clone()
            .unwrap_or_else(|| self.directory.join(dumps::MARKER_FILE_NAME))
    }
}

/// The two daily dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    Nations,
    Regions,
}

impl DumpKind {
    /// Name used in dump file names and archive paths
    pub fn name(&self) -> &'static str {
        match self {
            DumpKind::Nations => dumps::NATIONS,
            DumpKind::Regions => dumps::REGIONS,
        }
    }

    /// Tag of one record in the dump
    pub fn record_tag(&self) -> &'static str {
        match self {
            DumpKind::Nations => dumps::NATION_TAG,
            DumpKind::Regions => dumps::REGION_TAG,
        }
    }
}

/// How a dump sequence locates its file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Read the archived dump of this day instead of the current one
    pub date: Option<NaiveDate>,
    /// Use this path instead of the dump directory
    pub location: Option<PathBuf>,
    /// Skip the staleness check and only make sure a file exists
    pub no_update: bool,
}

impl DumpOptions {
    pub fn archived(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }
}

/// Single-pass iterator over the records of one dump file
pub struct DumpRecords<T> {
    decoder: StreamingDecoder<Box<dyn BufRead + Send>>,
    parse: fn(&XmlElement) -> DecodeResult<T>,
}

impl<T> DumpRecords<T> {
    /// Open a dump file, keeping only elements with `tag`
    pub fn open(
        path: &Path,
        tag: &str,
        parse: fn(&XmlElement) -> DecodeResult<T>,
        span: Span,
    ) -> ResourceResult<Self> {
        let file = File::open(path).map_err(|source| ResourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = StreamingDecoder::from_reader(file, TagFilter::tags([tag]))?.with_span(span);
        Ok(Self { decoder, parse })
    }
}

impl<T> Iterator for DumpRecords<T> {
    type Item = DecodeResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let parse = self.parse;
        self.decoder
            .next()
            .map(|element| element.and_then(|node| parse(&node)))
    }
}

/// Keeps the dumps present and current, and opens them as record sequences
pub struct DumpManager<D, M = FileMarkerStore, C = SystemClock> {
    resources: ResourceManager<D, M, C>,
    dump_url: Url,
    archive_url: Url,
    generation_time: NaiveTime,
    span: Span,
}

impl<D: Downloader> DumpManager<D> {
    /// Creates a manager over the configured dump directory and marker file
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the dump endpoints are invalid
    pub fn new(downloader: D, client: &ClientConfig, config: &DumpConfig) -> ApiResult<Self> {
        let markers = FileMarkerStore::new(config.marker_path());
        let resources = ResourceManager::new(downloader, markers, config.directory.clone());
        Ok(Self::with_resources(
            resources,
            client.dump_url()?,
            client.archive_url()?,
            config.generation_time,
        ))
    }
}

impl<D: Downloader, M: MarkerStore, C: Clock> DumpManager<D, M, C> {
    pub fn with_resources(
        resources: ResourceManager<D, M, C>,
        dump_url: Url,
        archive_url: Url,
        generation_time: NaiveTime,
    ) -> Self {
        let span = tracing::info_span!("dumps");
        Self {
            resources: resources.with_span(tracing::info_span!(parent: &span, "resources")),
            dump_url,
            archive_url,
            generation_time,
            span,
        }
    }

    /// Attach a span that parents this manager's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn resources(&self) -> &ResourceManager<D, M, C> {
        &self.resources
    }

    /// The current, daily regenerated dump
    pub fn daily_resource(&self, kind: DumpKind) -> ResourceResult<Resource> {
        let name = format!("{}.xml.gz", kind.name());
        Ok(Resource::daily(
            join_url(&self.dump_url, &name)?,
            name,
            self.generation_time,
        ))
    }

    /// The immutable archived dump of one day
    pub fn archived_resource(&self, kind: DumpKind, date: NaiveDate) -> ResourceResult<Resource> {
        let name = format!("{}-{}-xml.gz", date.format("%Y-%m-%d"), kind.name());
        let path = format!("{}/{}", kind.name(), name);
        Ok(Resource::fixed(join_url(&self.archive_url, &path)?, name))
    }

    /// The card list of one season
    pub fn card_resource(&self, season: u32) -> ResourceResult<Resource> {
        let name = format!("cardlist_S{season}.xml.gz");
        Ok(Resource::fixed(join_url(&self.dump_url, &name)?, name))
    }

    /// Make sure the dump file is present (and current, for the daily dump)
    pub async fn ensure(&mut self, kind: DumpKind, options: &DumpOptions) -> ResourceResult<PathBuf> {
        let location = options.location.as_deref();
        match options.date {
            Some(date) => {
                let resource = self.archived_resource(kind, date)?;
                self.resources.verify(&resource, location).await
            }
            None => {
                let resource = self.daily_resource(kind)?;
                if options.no_update {
                    self.resources.verify(&resource, location).await
                } else {
                    self.resources.update(&resource, location).await
                }
            }
        }
    }

    /// All nations in the dump
    pub async fn nations(&mut self, options: DumpOptions) -> ResourceResult<DumpRecords<NationSnapshot>> {
        let path = self.ensure(DumpKind::Nations, &options).await?;
        self.open(&path, DumpKind::Nations.record_tag(), NationSnapshot::from_xml)
    }

    /// All regions in the dump
    pub async fn regions(&mut self, options: DumpOptions) -> ResourceResult<DumpRecords<RegionSnapshot>> {
        let path = self.ensure(DumpKind::Regions, &options).await?;
        self.open(&path, DumpKind::Regions.record_tag(), RegionSnapshot::from_xml)
    }

    /// All cards of one season
    pub async fn cards(
        &mut self,
        season: u32,
        location: Option<&Path>,
    ) -> ResourceResult<DumpRecords<CardSnapshot>> {
        let resource = self.card_resource(season)?;
        let path = self.resources.verify(&resource, location).await?;
        self.open(&path, dumps::CARD_TAG, CardSnapshot::from_xml)
    }

    fn open<T>(
        &self,
        path: &Path,
        tag: &str,
        parse: fn(&XmlElement) -> DecodeResult<T>,
    ) -> ResourceResult<DumpRecords<T>> {
        info!(parent: &self.span, "Streaming <{}> records from {}", tag, path.display());
        DumpRecords::open(path, tag, parse, self.span.clone())
    }
}

fn join_url(base: &Url, path: &str) -> ResourceResult<Url> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    parse_url(&joined).map_err(|source| ResourceError::Download {
        name: path.to_string(),
        source,
    })
}

/// Default daily generation time, 06:00 UTC
pub fn generation_time() -> NaiveTime {
    NaiveTime::from_hms_opt(dumps::GENERATION_HOUR_UTC, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Latest day whose archived dump is published at `now`
///
/// A day's dump is generated at the end of that day and considered
/// available from 07:00 UTC the next day.
pub fn current_dump_day(now: DateTime<Utc>) -> NaiveDate {
    let days_back = if now.hour() >= dumps::PUBLISH_HOUR_UTC { 1 } else { 2 };
    now.date_naive() - Duration::days(days_back)
}

/// Time the most recent daily dump was generated; later events are not in it
pub fn last_dump_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    let time = generation_time();
    let today = now.date_naive().and_time(time).and_utc();
    if now >= today {
        today
    } else {
        today - Duration::days(1)
    }
}
