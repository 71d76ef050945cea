use super::progress::ProgressTracker;
use crate::utils::{Error, Result};
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// What the downloaded body must match, when the metadata says so.
#[derive(Debug, Default, Clone, Copy)]
pub struct Expected<'a> {
    pub sha1: Option<&'a str>,
    pub size: Option<u64>,
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("DreamServer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Fetches `url` and deserializes the body. One attempt, no retries.
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!("Fetching JSON from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "Failed to fetch {url}: HTTP {status}"
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Streams `url` into `destination`, replacing whatever was there.
    ///
    /// Bytes are written to a sibling `.part` file which is renamed over
    /// `destination` only after the body drained, the file was flushed and
    /// the expectations held. On any failure the part file is removed and
    /// an existing `destination` is left untouched.
    pub async fn download_file(
        &self,
        url: &str,
        destination: &Path,
        expected: Expected<'_>,
        tracker: Option<&mut ProgressTracker>,
    ) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(destination);
        let result = match self.stream_to(url, &part, expected, tracker).await {
            Ok(written) => tokio::fs::rename(&part, destination)
                .await
                .map(|()| written)
                .map_err(Error::from),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                debug!("Could not remove {part:?}: {cleanup}");
            }
        }
        result
    }

    async fn stream_to(
        &self,
        url: &str,
        part: &Path,
        expected: Expected<'_>,
        mut tracker: Option<&mut ProgressTracker>,
    ) -> Result<u64> {
        debug!("Downloading {url} to {part:?}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "Failed to download {url}: HTTP {status}"
            )));
        }

        if let (Some(tracker), Some(size)) = (tracker.as_mut(), response.content_length()) {
            tracker.set_total(size);
        }

        let mut file = File::create(part).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut hasher = expected.sha1.map(|_| Sha1::new());

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref mut hasher) = hasher {
                hasher.update(&chunk);
            }

            if let Some(tracker) = tracker.as_mut() {
                tracker.update(downloaded);
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if let Some(size) = expected.size {
            if size != downloaded {
                return Err(Error::Integrity(format!(
                    "Size mismatch for {url}: expected {size} bytes, got {downloaded}"
                )));
            }
        }

        if let (Some(expected), Some(hasher)) = (expected.sha1, hasher) {
            let computed = hex::encode(hasher.finalize());
            if !computed.eq_ignore_ascii_case(expected) {
                return Err(Error::Integrity(format!(
                    "Hash mismatch for {url}: expected {expected}, got {computed}"
                )));
            }
        }

        if let Some(tracker) = tracker {
            tracker.complete();
        }

        Ok(downloaded)
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}
