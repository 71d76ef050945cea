//! Custom utilities.

pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;

pub use config::Settings;
pub use error::{Error, Result};
