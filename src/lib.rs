//! mTLS Gate Library
//!
//! HTTP request gate enforcing mutual-TLS client authentication plus
//! allow-listing of client certificate subject attributes.
//!
//! # Features
//!
//! - **Chain verification**: WebPKI path validation against a PEM trust
//!   anchor with the client-authentication extended key usage
//! - **Allow-lists**: optional subject Common Name and serialNumber lists
//! - **Uniform rejection**: one configured status code and body for every
//!   failure, reasons only go to the diagnostic log
//! - **Axum middleware**: drop-in guard in front of any router
//!
//! TLS termination is left to the hosting transport.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mtls;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
