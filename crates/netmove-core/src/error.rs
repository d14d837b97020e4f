//! Error types for netmove-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid move {sequence}: {reason}")]
    InvalidMove { sequence: u32, reason: String },

    #[error("Invalid movement config: {0}")]
    InvalidConfig(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
