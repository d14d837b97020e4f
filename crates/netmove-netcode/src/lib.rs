//! Netmove Netcode - Client prediction and server reconciliation
//!
//! This crate provides the three network roles of a replicated entity:
//!
//! - **Prediction**: the controlling machine applies its own input at once
//!   and keeps every unacknowledged move
//! - **Reconciliation**: on each ack it resets to the authoritative pose and
//!   replays what the authority has not seen yet
//! - **Authority**: moves are queued on arrival and simulated together once
//!   per fixed interval, which produces one ack
//! - **Interpolation**: observers blend between consecutive acks
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐   Move (unreliable)   ┌────────────────────┐
//! │     LocalController      │──────────────────────▶│     Authority      │
//! │  ┌────────┐  ┌────────┐  │                       │  ┌──────────────┐  │
//! │  │ Input  │─▶│Predict │  │                       │  │  Move queue  │  │
//! │  └────────┘  └────────┘  │                       │  └──────┬───────┘  │
//! │       ┌──────────┐       │                       │         ▼          │
//! │       │MoveBuffer│       │   Ack (unreliable)    │  ┌──────────────┐  │
//! │       └────┬─────┘       │◀──────────────────────│  │Interval tick │  │
//! │            ▼             │                       │  └──────┬───────┘  │
//! │      ┌──────────┐        │                       └─────────┼──────────┘
//! │      │Reconciler│        │                                 │ Ack
//! │      └──────────┘        │                                 ▼
//! └──────────────────────────┘                       ┌────────────────────┐
//!                                                    │   RemoteObserver   │
//!                                                    │  (interpolation)   │
//!                                                    └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use netmove_core::{EntityId, Pose};
//! use netmove_netcode::{decode, encode, Frame, LocalController, NetConfig, NetEntity};
//!
//! let config = NetConfig::load("config.ron")?;
//! let mut player = NetEntity::new(
//!     EntityId(1),
//!     Box::new(LocalController::new(Pose::default(), &config)),
//! );
//!
//! loop {
//!     // Predict locally and ship the move
//!     for envelope in player.update(&Frame::with_input(dt, sample_input())) {
//!         transport.send(&encode(&envelope)?, &server)?;
//!     }
//!
//!     // Reconcile against whatever acks arrived
//!     while let Some((bytes, _)) = transport.recv()? {
//!         player.receive(&decode(&bytes)?)?;
//!     }
//!
//!     render(&player.current_pose());
//! }
//! ```

mod authority;
mod codec;
mod config;
mod emulation;
mod error;
mod interpolation;
mod move_buffer;
mod prediction;
mod reconciliation;
mod role;
mod transport;

pub use authority::Authority;
pub use codec::{decode, encode, recv_envelope, send_envelope, Envelope, Packet};
pub use config::NetConfig;
pub use emulation::{EmulatedLink, NetworkConditions};
pub use error::{Error, Result};
pub use interpolation::{InterpolationBuffer, RemoteObserver};
pub use move_buffer::MoveBuffer;
pub use prediction::{LocalController, NetStats};
pub use reconciliation::{OrientationPolicy, ReconcileOutcome, Reconciler};
pub use role::{Frame, NetEntity, PublishFn, Role, RoleKind};
pub use transport::{Address, Transport, UdpTransport};
