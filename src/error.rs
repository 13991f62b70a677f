//! Error types for the mTLS gate

use std::io;

use thiserror::Error;

/// Result type alias for the mTLS gate
pub type Result<T> = std::result::Result<T, Error>;

/// Startup errors.
///
/// Only construction of the gate can fail.  Per-request failures are folded
/// into a [`crate::mtls::Decision`] and never surface as an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trust anchor file could not be read
    #[error("Cannot read trust anchor '{path}': {source}")]
    TrustAnchorUnreadable {
        /// Path that was attempted
        path: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Trust anchor contained no usable certificate (strict mode only)
    #[error("No usable certificates found in trust anchor '{0}'")]
    EmptyTrustAnchor(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
