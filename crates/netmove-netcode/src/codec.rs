//! Wire encoding for netcode packets
//!
//! Every datagram carries one [`Envelope`]: the entity it concerns and a
//! [`Packet`]. Encoding is bincode; a datagram that does not decode is an
//! error for the caller to log and drop, never a panic.

use crate::{Address, Result, Transport};
use netmove_core::{Ack, EntityId, Move};
use serde::{Deserialize, Serialize};

/// Messages exchanged between roles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    /// Controller to authority, unreliable
    Move(Move),
    /// Authority to controller and observers, unreliable broadcast
    Ack(Ack),
}

/// A packet addressed to one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub entity: EntityId,
    pub packet: Packet,
}

impl Envelope {
    /// Wrap a packet for an entity
    pub fn new(entity: EntityId, packet: Packet) -> Self {
        Self { entity, packet }
    }
}

/// Encode an envelope into datagram bytes
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>> {
    Ok(bincode::serialize(envelope)?)
}

/// Decode datagram bytes into an envelope
pub fn decode(bytes: &[u8]) -> Result<Envelope> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode and send one envelope; fire-and-forget
pub fn send_envelope<T: Transport>(
    transport: &T,
    envelope: &Envelope,
    target: &Address,
) -> Result<()> {
    let bytes = encode(envelope)?;
    transport
        .send(&bytes, target)
        .map_err(|e| crate::Error::Transport(e.to_string()))
}

/// Receive and decode the next envelope, if one is waiting
///
/// Undecodable datagrams are logged and skipped.
pub fn recv_envelope<T: Transport>(transport: &T) -> Result<Option<(Envelope, Address)>> {
    loop {
        let received = transport
            .recv()
            .map_err(|e| crate::Error::Transport(e.to_string()))?;
        let Some((bytes, source)) = received else {
            return Ok(None);
        };
        match decode(&bytes) {
            Ok(envelope) => return Ok(Some((envelope, source))),
            Err(err) => {
                tracing::warn!(?source, len = bytes.len(), error = %err, "Dropping undecodable datagram");
            }
        }
    }
}
