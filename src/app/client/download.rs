//! File download operations with atomic writes and streaming
//!
//! Dumps run to tens of megabytes, so the body is streamed chunk by chunk
//! into a temporary file next to the destination and renamed into place only
//! once complete. An interrupted download never leaves a partial file under
//! the final name.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

use super::http::HttpHandler;
use crate::constants::files;
use crate::errors::{ApiError, ApiResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a mut HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a mut HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Downloads a file to the specified path, replacing any existing file
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to download from
    /// * `destination` - The path to save the file to
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - The HTTP request fails or returns a non-success status
    /// - File I/O operations fail
    /// - The final rename fails
    pub async fn download_file(&mut self, url: &Url, destination: &Path) -> ApiResult<u64> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = temp_path_for(destination);
        let written = match self.download_to(url, &temp_path).await {
            Ok(written) => written,
            Err(e) => {
                if temp_path.exists() {
                    let _ = tokio::fs::remove_file(&temp_path).await;
                }
                warn!("Download of {} failed: {}", url, e);
                return Err(e);
            }
        };

        tokio::fs::rename(&temp_path, destination)
            .await
            .map_err(|_e| ApiError::AtomicOperationFailed {
                temp_path: temp_path.clone(),
                final_path: destination.to_path_buf(),
            })?;

        info!(
            "Downloaded {} ({} bytes) to {}",
            url,
            written,
            destination.display()
        );
        Ok(written)
    }

    /// Streams the response body into a temporary path
    async fn download_to(&mut self, url: &Url, temp_path: &Path) -> ApiResult<u64> {
        let mut response = self.http_handler.get_response(url, &[], None).await?;

        let mut file = File::create(temp_path).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Temporary sibling of a destination path
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(files::TEMP_FILE_SUFFIX);
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_keeps_full_name() {
        // Test that the temp file sits next to the destination with the suffix appended
        let temp = temp_path_for(Path::new("/data/dumps/nations.xml.gz"));
        assert_eq!(temp, PathBuf::from("/data/dumps/nations.xml.gz.tmp"));
    }
}
