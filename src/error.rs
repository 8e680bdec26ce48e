//! Error types for the webhook process.
//!
//! Admission decisions never fail: everything that goes wrong while handling a
//! request is folded into a deny. These errors cover start-up only.

use thiserror::Error;

/// Error type for webhook start-up
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for start-up operations
pub type Result<T> = std::result::Result<T, Error>;
