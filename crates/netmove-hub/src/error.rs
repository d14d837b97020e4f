//! Error types for netmove-hub

use netmove_core::EntityId;
use thiserror::Error;

/// Result type for netmove-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in netmove-hub
#[derive(Debug, Error)]
pub enum Error {
    /// Envelope addressed to an entity the hub does not host
    #[error("entity {0} is not hosted by this hub")]
    UnknownEntity(EntityId),

    /// Spawn of an entity that already exists
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// Spawn beyond the configured entity limit
    #[error("hub is full ({0} entities)")]
    EntityLimit(usize),

    /// Netcode error
    #[error("netcode error: {0}")]
    Netcode(#[from] netmove_netcode::Error),
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self {
        Error::Netcode(netmove_netcode::Error::from(err))
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
// This function is never called but will fail to compile if the bound is not satisfied.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
