//! Running the dedicated server.

pub mod eula;
pub mod process;
pub mod relay;

pub use process::ServerLauncher;
