use serde::{Deserialize, Serialize};

/// Minecraft models for the version catalog and per-version metadata.
/// These structs are used to deserialize JSON data from the Minecraft API.
#[derive(Debug, Deserialize, Serialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: Option<LatestVersions>,
    pub versions: Vec<VersionInfo>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VersionInfo {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: Option<String>,
    pub url: String,
}

/// Only the server download is consulted; everything else in the document is ignored.
#[derive(Debug, Deserialize, Serialize)]
pub struct VersionDetails {
    #[serde(default)]
    pub id: Option<String>,
    pub downloads: Downloads,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Downloads {
    /// Absent for versions older than 1.2.5.
    pub server: Option<DownloadInfo>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DownloadInfo {
    pub url: String,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}
