//! Download-if-missing-or-stale policy engine

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, Span};
use url::Url;

use super::marker::MarkerStore;
use super::{Clock, Resource, SystemClock};
use crate::errors::{ApiResult, ResourceError, ResourceResult};

/// Fetches a remote file to a local path
#[async_trait]
pub trait Downloader: Send {
    /// Download `source` to `destination`, returning the bytes written
    async fn download(&mut self, source: &Url, destination: &Path) -> ApiResult<u64>;
}

#[async_trait]
impl<T: Downloader + ?Sized> Downloader for &mut T {
    async fn download(&mut self, source: &Url, destination: &Path) -> ApiResult<u64> {
        (**self).download(source, destination).await
    }
}

/// Keeps local copies of resources present and current
pub struct ResourceManager<D, M, C = SystemClock> {
    downloader: D,
    markers: M,
    clock: C,
    directory: PathBuf,
    span: Span,
}

impl<D: Downloader, M: MarkerStore> ResourceManager<D, M, SystemClock> {
    /// Creates a manager that stores resources under `directory`
    pub fn new(downloader: D, markers: M, directory: impl Into<PathBuf>) -> Self {
        Self::with_clock(downloader, markers, SystemClock, directory)
    }
}

impl<D: Downloader, M: MarkerStore, C: Clock> ResourceManager<D, M, C> {
    pub fn with_clock(downloader: D, markers: M, clock: C, directory: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            markers,
            clock,
            directory: directory.into(),
            span: tracing::info_span!("resources"),
        }
    }

    /// Attach a span that parents this manager's log events
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn markers(&self) -> &M {
        &self.markers
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Local path of a resource: the override if given, else its name under the directory
    pub fn resolve(&self, resource: &Resource, target: Option<&Path>) -> PathBuf {
        match target {
            Some(path) => path.to_path_buf(),
            None => self.directory.join(&resource.name),
        }
    }

    /// Fetch the resource unconditionally
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Download` if the download fails
    pub async fn download(
        &mut self,
        resource: &Resource,
        target: Option<&Path>,
    ) -> ResourceResult<PathBuf> {
        let path = self.resolve(resource, target);
        info!(parent: &self.span, "Downloading {} to {}", resource.source, path.display());
        self.downloader
            .download(&resource.source, &path)
            .await
            .map_err(|source| ResourceError::Download {
                name: resource.name.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Fetch the resource only if there is no local copy
    pub async fn verify(
        &mut self,
        resource: &Resource,
        target: Option<&Path>,
    ) -> ResourceResult<PathBuf> {
        let path = self.resolve(resource, target);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(parent: &self.span, "{} present at {}", resource.name, path.display());
            return Ok(path);
        }
        info!(parent: &self.span, "{} missing, downloading", resource.name);
        self.download(resource, target).await
    }

    /// Fetch the resource if it was never fetched or its copy is outdated
    ///
    /// Otherwise falls back to `verify()`, in case the file was removed while
    /// the marker still calls it fresh. The marker store is persisted on every
    /// path, including when nothing was downloaded.
    pub async fn update(
        &mut self,
        resource: &Resource,
        target: Option<&Path>,
    ) -> ResourceResult<PathBuf> {
        self.markers.load().await;
        let now = self.clock.now();

        let refetch = match self.markers.get(&resource.name) {
            None => {
                info!(parent: &self.span, "No marker for {}", resource.name);
                true
            }
            Some(previous) if resource.policy.is_outdated(previous, now) => {
                info!(
                    parent: &self.span,
                    "{} last fetched {}, outdated", resource.name, previous
                );
                true
            }
            Some(_) => false,
        };

        let path = if refetch {
            let path = self.download(resource, target).await?;
            self.markers.set(&resource.name, now);
            path
        } else {
            self.verify(resource, target).await?
        };

        self.markers.persist().await?;
        Ok(path)
    }
}
