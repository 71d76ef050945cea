//! Vanilla server versions.

pub mod downloader;
pub mod models;
pub mod versions;

pub use downloader::ServerDownloader;
pub use versions::{VersionManager, resolve};
