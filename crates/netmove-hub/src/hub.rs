//! Hub - Authority host for many entities
//!
//! The hub runs one [`Authority`] per hosted entity behind a single interval
//! clock. Moves are routed by [`EntityId`]; on every interval boundary each
//! authority drains its own queue and produces its own ack. Entities never
//! see each other's moves.

use crate::config::HubConfig;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use netmove_core::{EntityId, IntervalTimer, Pose, Tick};
use netmove_netcode::{decode, Authority, Envelope, Packet, RoleKind};
use std::time::Duration;

/// Authority side of a session
///
/// Hosted authorities are stepped only through
/// [`Authority::process_interval`] on the hub's shared clock. Their own
/// interval timers never advance, and each authority's `server_tick` counts
/// the intervals since it was spawned.
///
/// ```
/// use netmove_core::{EntityId, Move, Pose};
/// use netmove_hub::Hub;
/// use netmove_netcode::{Envelope, Packet};
///
/// let mut hub = Hub::new();
/// hub.spawn(EntityId(1), Pose::default()).unwrap();
///
/// let step = Move {
///     sequence: 1,
///     forward_axis: 1.0,
///     right_axis: 0.0,
///     yaw_delta: 0.0,
///     pitch_delta: 0.0,
/// };
/// hub.receive(&Envelope::new(EntityId(1), Packet::Move(step))).unwrap();
///
/// let acks = hub.process_interval();
/// assert_eq!(acks.len(), 1);
/// assert_eq!(acks[0].entity, EntityId(1));
/// ```
#[derive(Debug)]
pub struct Hub {
    /// Hosted entities in spawn order
    authorities: IndexMap<EntityId, Authority>,
    /// Shared interval clock
    timer: IntervalTimer,
    config: HubConfig,
    /// Intervals processed by the hub
    tick: Tick,
}

impl Hub {
    /// Create a hub with the default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with a specific configuration
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            authorities: IndexMap::new(),
            timer: IntervalTimer::new(config.net.authority_interval()),
            config,
            tick: 0,
        }
    }

    /// Start hosting an entity at `pose`
    pub fn spawn(&mut self, entity: EntityId, pose: Pose) -> Result<()> {
        if self.authorities.contains_key(&entity) {
            return Err(Error::DuplicateEntity(entity));
        }
        if !self.config.has_room(self.authorities.len()) {
            return Err(Error::EntityLimit(self.authorities.len()));
        }
        self.authorities
            .insert(entity, Authority::new(pose, &self.config.net));
        tracing::debug!(%entity, hosted = self.authorities.len(), "Spawned entity");
        Ok(())
    }

    /// Stop hosting an entity; returns its final authority state
    pub fn despawn(&mut self, entity: EntityId) -> Option<Authority> {
        let removed = self.authorities.shift_remove(&entity);
        if removed.is_some() {
            tracing::debug!(%entity, hosted = self.authorities.len(), "Despawned entity");
        }
        removed
    }

    /// Route an inbound envelope to its entity
    pub fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        let authority = self
            .authorities
            .get_mut(&envelope.entity)
            .ok_or(Error::UnknownEntity(envelope.entity))?;
        match envelope.packet {
            Packet::Move(step) => Ok(authority.receive_move(step)?),
            Packet::Ack(_) => Err(netmove_netcode::Error::UnexpectedPacket {
                role: RoleKind::Authority,
                packet: "ack",
            }
            .into()),
        }
    }

    /// Decode a datagram and route it; returns the entity it addressed
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<EntityId> {
        let envelope = decode(bytes)?;
        self.receive(&envelope)?;
        Ok(envelope.entity)
    }

    /// Advance the shared clock; returns one ack per entity on a boundary
    pub fn update(&mut self, elapsed: Duration) -> Vec<Envelope> {
        if self.timer.advance(elapsed) {
            self.process_interval()
        } else {
            Vec::new()
        }
    }

    /// Run one interval for every hosted entity
    pub fn process_interval(&mut self) -> Vec<Envelope> {
        self.tick += 1;
        let acks: Vec<Envelope> = self
            .authorities
            .iter_mut()
            .map(|(entity, authority)| {
                Envelope::new(*entity, Packet::Ack(authority.process_interval()))
            })
            .collect();
        tracing::trace!(tick = self.tick, entities = acks.len(), "Hub interval");
        acks
    }

    /// Authoritative pose of an entity
    pub fn pose(&self, entity: EntityId) -> Option<Pose> {
        self.authorities.get(&entity).map(Authority::current_pose)
    }

    /// Authority state of an entity
    pub fn authority(&self, entity: EntityId) -> Option<&Authority> {
        self.authorities.get(&entity)
    }

    /// Hosted entity ids in spawn order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.authorities.keys().copied()
    }

    /// Number of hosted entities
    pub fn entity_count(&self) -> usize {
        self.authorities.len()
    }

    /// Intervals processed so far
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Get the configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
