//! Network roles
//!
//! Every replicated entity is driven by exactly one role on each machine:
//! the controlling machine predicts it, the authority simulates it, and
//! everyone else interpolates it. The role is picked once, at construction,
//! and each implementation carries only the state it needs.

use crate::{
    Authority, Envelope, Error, LocalController, Packet, RemoteObserver, Result,
};
use netmove_core::{AxisInput, EntityId, Pose};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which side of the protocol a role plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    /// Owns input, predicts, reconciles
    LocalController,
    /// Simulates received moves, emits acks
    Authority,
    /// Interpolates between acks
    RemoteObserver,
}

/// Input to one role update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    /// Time since the previous update
    pub elapsed: Duration,
    /// Controller input sampled this frame; ignored by other roles
    pub input: AxisInput,
}

impl Frame {
    /// A frame with no input
    pub fn idle(elapsed: Duration) -> Self {
        Self {
            elapsed,
            input: AxisInput::default(),
        }
    }

    /// A frame carrying controller input
    pub fn with_input(elapsed: Duration, input: AxisInput) -> Self {
        Self { elapsed, input }
    }
}

/// Per-role behavior behind a replicated entity
pub trait Role: Send {
    /// Which role this is
    fn kind(&self) -> RoleKind;

    /// Pose this machine displays for the entity
    fn current_pose(&self) -> Pose;

    /// Handle an inbound packet
    fn receive(&mut self, packet: &Packet) -> Result<()>;

    /// Advance one frame; returns packets to transmit
    fn update(&mut self, frame: &Frame) -> Vec<Packet>;
}

fn unexpected(role: RoleKind, packet: &Packet) -> Error {
    let packet = match packet {
        Packet::Move(_) => "move",
        Packet::Ack(_) => "ack",
    };
    Error::UnexpectedPacket { role, packet }
}

impl Role for LocalController {
    fn kind(&self) -> RoleKind {
        RoleKind::LocalController
    }

    fn current_pose(&self) -> Pose {
        LocalController::current_pose(self)
    }

    fn receive(&mut self, packet: &Packet) -> Result<()> {
        match packet {
            Packet::Ack(ack) => {
                self.on_ack(ack);
                Ok(())
            }
            Packet::Move(_) => Err(unexpected(self.kind(), packet)),
        }
    }

    fn update(&mut self, frame: &Frame) -> Vec<Packet> {
        if !frame.input.is_idle() {
            self.input_mut().record(frame.input);
        }
        self.tick().map(Packet::Move).into_iter().collect()
    }
}

impl Role for Authority {
    fn kind(&self) -> RoleKind {
        RoleKind::Authority
    }

    fn current_pose(&self) -> Pose {
        Authority::current_pose(self)
    }

    fn receive(&mut self, packet: &Packet) -> Result<()> {
        match packet {
            Packet::Move(step) => self.receive_move(*step),
            Packet::Ack(_) => Err(unexpected(self.kind(), packet)),
        }
    }

    fn update(&mut self, frame: &Frame) -> Vec<Packet> {
        Authority::update(self, frame.elapsed)
            .map(Packet::Ack)
            .into_iter()
            .collect()
    }
}

impl Role for RemoteObserver {
    fn kind(&self) -> RoleKind {
        RoleKind::RemoteObserver
    }

    fn current_pose(&self) -> Pose {
        RemoteObserver::current_pose(self)
    }

    fn receive(&mut self, packet: &Packet) -> Result<()> {
        match packet {
            Packet::Ack(ack) => {
                self.on_ack(ack);
                Ok(())
            }
            Packet::Move(_) => Err(unexpected(self.kind(), packet)),
        }
    }

    fn update(&mut self, frame: &Frame) -> Vec<Packet> {
        RemoteObserver::update(self, frame.elapsed);
        Vec::new()
    }
}

/// Callback invoked with the displayed pose after every update
pub type PublishFn = Box<dyn FnMut(EntityId, &Pose) + Send>;

/// A replicated entity: an id, its role on this machine, and an optional
/// publish hook for rendering or game logic
pub struct NetEntity {
    id: EntityId,
    role: Box<dyn Role>,
    publish: Option<PublishFn>,
}

impl NetEntity {
    /// Wrap a role for the given entity
    pub fn new(id: EntityId, role: Box<dyn Role>) -> Self {
        Self {
            id,
            role,
            publish: None,
        }
    }

    /// Publish the displayed pose after every update
    pub fn with_publish<F>(mut self, publish: F) -> Self
    where
        F: FnMut(EntityId, &Pose) + Send + 'static,
    {
        self.publish = Some(Box::new(publish));
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    pub fn current_pose(&self) -> Pose {
        self.role.current_pose()
    }

    /// Deliver an inbound envelope
    ///
    /// Returns `Ok(false)` without touching the role when the envelope is
    /// addressed to another entity.
    pub fn receive(&mut self, envelope: &Envelope) -> Result<bool> {
        if envelope.entity != self.id {
            tracing::trace!(entity = %self.id, target = %envelope.entity, "Envelope for another entity");
            return Ok(false);
        }
        self.role.receive(&envelope.packet)?;
        Ok(true)
    }

    /// Advance one frame; returns envelopes to transmit
    pub fn update(&mut self, frame: &Frame) -> Vec<Envelope> {
        let outgoing = self.role.update(frame);
        if let Some(publish) = self.publish.as_mut() {
            publish(self.id, &self.role.current_pose());
        }
        outgoing
            .into_iter()
            .map(|packet| Envelope::new(self.id, packet))
            .collect()
    }
}

impl std::fmt::Debug for NetEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetEntity")
            .field("id", &self.id)
            .field("kind", &self.role.kind())
            .field("publish", &self.publish.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, EmulatedLink, NetConfig, NetworkConditions};
    use netmove_core::{Ack, Vec3};
    use std::sync::{Arc, Mutex};

    const FRAME: Duration = Duration::from_millis(20);

    fn entity(kind: RoleKind, config: &NetConfig) -> NetEntity {
        let id = EntityId(1);
        let role: Box<dyn Role> = match kind {
            RoleKind::LocalController => Box::new(LocalController::new(Pose::default(), config)),
            RoleKind::Authority => Box::new(Authority::new(Pose::default(), config)),
            RoleKind::RemoteObserver => Box::new(RemoteObserver::new(Pose::default(), config)),
        };
        NetEntity::new(id, role)
    }

    fn deliver(link: &mut EmulatedLink, elapsed: Duration, target: &mut NetEntity) {
        for bytes in link.advance(elapsed) {
            let envelope = decode(&bytes).unwrap();
            target.receive(&envelope).unwrap();
        }
    }

    #[test]
    fn test_roles_reject_foreign_packets() {
        let config = NetConfig::default();
        let ack = Packet::Ack(Ack::new(1, 1, Pose::default()));
        let step = Packet::Move(netmove_core::Move {
            sequence: 1,
            forward_axis: 1.0,
            right_axis: 0.0,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
        });

        let mut controller = LocalController::new(Pose::default(), &config);
        assert!(controller.receive(&step).is_err());
        let mut authority = Authority::new(Pose::default(), &config);
        assert!(matches!(
            Role::receive(&mut authority, &ack),
            Err(Error::UnexpectedPacket {
                role: RoleKind::Authority,
                ..
            })
        ));
        let mut observer = RemoteObserver::new(Pose::default(), &config);
        assert!(observer.receive(&step).is_err());
    }

    #[test]
    fn test_envelope_for_other_entity_ignored() {
        let config = NetConfig::default();
        let mut observer = entity(RoleKind::RemoteObserver, &config);
        let envelope = Envelope::new(
            EntityId(2),
            Packet::Ack(Ack::new(0, 1, Pose::at(Vec3::X))),
        );

        assert!(!observer.receive(&envelope).unwrap());
        assert_eq!(observer.current_pose(), Pose::default());
    }

    #[test]
    fn test_publish_sees_every_update() {
        let config = NetConfig::default();
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&published);
        let mut controller = entity(RoleKind::LocalController, &config)
            .with_publish(move |id, pose| sink.lock().unwrap().push((id, *pose)));

        let outgoing = controller.update(&Frame::with_input(FRAME, AxisInput::forward(1.0)));
        assert_eq!(outgoing.len(), 1);
        assert!(controller.update(&Frame::idle(FRAME)).is_empty());

        let published = published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].0, EntityId(1));
        assert_eq!(published[1].1.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_three_roles_over_perfect_links() {
        let config = NetConfig::default();
        let mut controller = entity(RoleKind::LocalController, &config);
        let mut authority = entity(RoleKind::Authority, &config);
        let mut observer = entity(RoleKind::RemoteObserver, &config);
        let mut uplink = EmulatedLink::new(NetworkConditions::perfect(), 1);
        let mut downlink = EmulatedLink::new(NetworkConditions::perfect(), 2);

        for frame in 0..50 {
            let input = if frame < 20 {
                AxisInput::new(1.0, 0.0, 2.0, 0.0)
            } else {
                AxisInput::default()
            };
            for envelope in controller.update(&Frame::with_input(FRAME, input)) {
                uplink.send(encode(&envelope).unwrap());
            }
            deliver(&mut uplink, FRAME, &mut authority);

            let acks = authority.update(&Frame::idle(FRAME));
            for envelope in &acks {
                let bytes = encode(envelope).unwrap();
                controller.receive(envelope).unwrap();
                downlink.send(bytes);
            }
            deliver(&mut downlink, FRAME, &mut observer);
            observer.update(&Frame::idle(FRAME));
        }

        let truth = authority.current_pose();
        assert_eq!(controller.current_pose(), truth);
        assert!(observer.current_pose().distance(&truth) < 1e-3);
    }

    #[test]
    fn test_convergence_under_loss_and_jitter() {
        let config = NetConfig::default();
        let mut controller = entity(RoleKind::LocalController, &config);
        let mut authority = entity(RoleKind::Authority, &config);
        let conditions = NetworkConditions {
            latency_ms: 60,
            jitter_ms: 40,
            loss: 0.2,
        };
        let mut uplink = EmulatedLink::new(conditions, 11);
        let mut downlink = EmulatedLink::new(conditions, 12);

        for frame in 0..300 {
            if frame == 100 {
                // Settle: the tail of the run crosses a clean network
                uplink.set_conditions(NetworkConditions::perfect());
                downlink.set_conditions(NetworkConditions::perfect());
            }
            let input = if frame < 150 {
                AxisInput::new(1.0, 0.3, 1.5, 0.0)
            } else {
                AxisInput::default()
            };
            for envelope in controller.update(&Frame::with_input(FRAME, input)) {
                uplink.send(encode(&envelope).unwrap());
            }
            deliver(&mut uplink, FRAME, &mut authority);
            for envelope in authority.update(&Frame::idle(FRAME)) {
                downlink.send(encode(&envelope).unwrap());
            }
            deliver(&mut downlink, FRAME, &mut controller);
        }

        // Moves lost earlier are never replayed once a later ack covers them
        let truth = authority.current_pose();
        assert!(controller.current_pose().distance(&truth) < 1e-3);
        assert!(uplink.dropped() > 0);
    }
}
