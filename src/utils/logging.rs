//! Minimal logging setup.

use env_logger::{Builder, Env};
use std::io::Write;

/// Default filter when `RUST_LOG` is unset. HTTP internals stay quiet.
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,rustls=warn";

/// Initializes the global logger from `RUST_LOG`.
///
/// Lines are written to stderr as `[LEVEL] message` so they do not get mixed
/// into the relayed server output on stdout.
pub fn init_from_env() {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}
