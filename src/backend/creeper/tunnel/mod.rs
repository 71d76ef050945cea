//! Public TCP tunnel through ngrok.

pub mod agent;
pub mod api;

pub use agent::{NgrokAgent, Tunnel};
