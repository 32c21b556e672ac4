//! LINE bot for the Dainichi kerosene heater product line.
//!
//! Two entry points share this library: the webhook service (`main.rs`)
//! answers product questions, and the `richmenu` binary provisions the
//! account's rich menus.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod products;
pub mod richmenu;
pub mod signature;
pub mod types;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{LineApi, LineClient};
pub use config::{ApiEndpoints, BatchFailurePolicy, ChannelToken, HandlerConfig, ServerConfig};
pub use error::{Error, Result};
pub use handler::{EventHandler, EventOutcome};
pub use richmenu::Provisioner;
pub use webhook::{router, AppState};

/// Installs the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
