//! Creeper. Core server provisioning functionality.

/// Command-line arguments and prompts.
pub mod cli;
/// HTTP downloading and progress tracking.
pub mod downloader;
/// Running the server process.
pub mod server;
/// ngrok tunnel management.
pub mod tunnel;
/// Version catalog and server jar download.
pub mod vanilla;
