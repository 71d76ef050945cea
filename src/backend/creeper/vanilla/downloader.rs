use super::models::VersionDetails;
use crate::backend::creeper::downloader::{Expected, HttpDownloader, ProgressTracker};
use crate::utils::{Error, Result};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Downloads the dedicated server jar of a single version.
pub struct ServerDownloader {
    downloader: Arc<HttpDownloader>,
}

impl ServerDownloader {
    pub fn new(downloader: Arc<HttpDownloader>) -> Self {
        Self { downloader }
    }

    /// Reads the version metadata at `metadata_url` and streams the server
    /// jar it points to into `destination`, overwriting any existing file.
    ///
    /// Returns once the jar is fully written and closed.
    pub async fn download(&self, metadata_url: &str, destination: &Path) -> Result<u64> {
        info!("Fetching version details from {metadata_url}");
        let details: VersionDetails = self.downloader.get_json(metadata_url).await?;

        let server = details.downloads.server.ok_or_else(|| {
            let version = details.id.as_deref().unwrap_or(metadata_url);
            Error::NotFound(format!("version {version} has no server download"))
        })?;

        info!("Downloading Minecraft server from {}", server.url);
        let mut tracker = ProgressTracker::new(
            destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "server.jar".to_string()),
        );
        if let Some(size) = server.size {
            tracker.set_total(size);
        }

        let expected = Expected {
            sha1: server.sha1.as_deref(),
            size: server.size,
        };
        let written = self
            .downloader
            .download_file(&server.url, destination, expected, Some(&mut tracker))
            .await?;

        info!("Saved {written} bytes to {destination:?}");
        Ok(written)
    }
}
