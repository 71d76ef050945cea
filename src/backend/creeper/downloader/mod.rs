//! HTTP downloading and progress tracking.

pub mod http;
pub mod progress;

pub use http::{Expected, HttpDownloader};
pub use progress::ProgressTracker;
