//! Version catalog lookup.

use super::models::{VersionInfo, VersionManifest};
use crate::backend::creeper::downloader::HttpDownloader;
use crate::utils::{Error, Result};
use log::info;
use std::sync::Arc;

/// Fetches the version catalog from Mojang (or whatever `manifest_url` points at).
pub struct VersionManager {
    downloader: Arc<HttpDownloader>,
    manifest_url: String,
}

impl VersionManager {
    pub fn new(downloader: Arc<HttpDownloader>, manifest_url: impl Into<String>) -> Self {
        Self {
            downloader,
            manifest_url: manifest_url.into(),
        }
    }

    /// Downloads the catalog. A single GET, errors are not retried.
    pub async fn fetch_catalog(&self) -> Result<VersionManifest> {
        info!("Fetching version manifest from {}", self.manifest_url);

        let manifest: VersionManifest = self.downloader.get_json(&self.manifest_url).await?;
        info!(
            "Version manifest lists {} versions",
            manifest.versions.len()
        );

        Ok(manifest)
    }
}

impl VersionManifest {
    pub fn find(&self, version_id: &str) -> Option<&VersionInfo> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// Latest release id, if the catalog advertises one.
    pub fn latest_release(&self) -> Option<&str> {
        self.latest.as_ref().map(|latest| latest.release.as_str())
    }
}

/// Returns the metadata URL of `version_id`.
pub fn resolve<'a>(catalog: &'a VersionManifest, version_id: &str) -> Result<&'a str> {
    catalog
        .find(version_id)
        .map(|v| v.url.as_str())
        .ok_or_else(|| Error::NotFound(format!("version {version_id} is not available")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    fn catalog(json: &str) -> VersionManifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_known_version() {
        let catalog = catalog(r#"{"versions":[{"id":"1.20.1","url":"U"}]}"#);
        assert_eq!(resolve(&catalog, "1.20.1").unwrap(), "U");
    }

    #[test]
    fn unknown_version_names_the_request() {
        let catalog = catalog(r#"{"versions":[{"id":"1.20.1","url":"U"}]}"#);
        let err = resolve(&catalog, "1.19.0").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref msg) if msg.contains("1.19.0")));
    }

    #[test]
    fn match_is_exact() {
        let catalog = catalog(
            r#"{"versions":[
                {"id":"1.20.1-pre1","url":"pre"},
                {"id":"1.20.1","url":"release"},
                {"id":"1.20","url":"old"}
            ]}"#,
        );
        assert_eq!(resolve(&catalog, "1.20.1").unwrap(), "release");
        assert_eq!(resolve(&catalog, "1.20").unwrap(), "old");
        assert!(resolve(&catalog, "1.20.").is_err());
        assert!(resolve(&catalog, " 1.20.1").is_err());
    }

    #[test]
    fn latest_release_is_optional() {
        let json = r#"{"latest":{"release":"1.21.8","snapshot":"25w31a"},"versions":[]}"#;
        assert_eq!(catalog(json).latest_release(), Some("1.21.8"));
        assert_eq!(catalog(r#"{"versions":[]}"#).latest_release(), None);
    }

    #[tokio::test]
    async fn fetches_catalog_over_http() {
        let router = Router::new().route(
            "/mc/game/version_manifest.json",
            get(|| async {
                r#"{"latest":{"release":"1.20.1","snapshot":"23w31a"},
                    "versions":[{"id":"23w31a","type":"snapshot","url":"S"},
                                {"id":"1.20.1","type":"release","url":"U"}]}"#
            }),
        );
        let base = serve(router).await;
        let manager = VersionManager::new(
            Arc::new(HttpDownloader::new().unwrap()),
            format!("{base}/mc/game/version_manifest.json"),
        );

        let catalog = manager.fetch_catalog().await.unwrap();
        assert_eq!(catalog.versions.len(), 2);
        assert_eq!(resolve(&catalog, "1.20.1").unwrap(), "U");
    }

    #[tokio::test]
    async fn catalog_server_error_is_network_error() {
        let router = Router::new().route(
            "/mc/game/version_manifest.json",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = serve(router).await;
        let manager = VersionManager::new(
            Arc::new(HttpDownloader::new().unwrap()),
            format!("{base}/mc/game/version_manifest.json"),
        );

        let err = manager.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_network_error() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let manager = VersionManager::new(
            Arc::new(HttpDownloader::new().unwrap()),
            format!("http://{addr}/version_manifest.json"),
        );
        let err = manager.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
