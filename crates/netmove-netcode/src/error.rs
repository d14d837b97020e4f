//! Error types for netmove-netcode
//!
//! Protocol anomalies (lost moves, lost or reordered acks, sequence
//! mismatches) are handled by policy and never show up here. These errors
//! cover the edges: bad input at the authority, wire bytes, sockets, and
//! configuration.

use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error)]
pub enum Error {
    /// Move rejected by validation, or another core error
    #[error(transparent)]
    Core(#[from] netmove_core::Error),

    /// Bounded move buffer cannot take another move
    #[error("Move buffer full, {0} moves already queued")]
    MoveBufferFull(usize),

    /// Wire bytes could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Socket error
    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport implementation error
    #[error("Transport error: {0}")]
    Transport(String),

    /// A role received a packet it never handles
    #[error("{role:?} cannot handle {packet} packets")]
    UnexpectedPacket {
        role: crate::RoleKind,
        packet: &'static str,
    },

    /// Configuration could not be parsed or is invalid
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
