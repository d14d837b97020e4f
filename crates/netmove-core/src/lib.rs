//! Netmove Core - Movement model for client prediction and server reconciliation
//!
//! This crate holds everything the three network roles agree on:
//! - Wire records (`Move`, `Ack`) and the simulated `Pose`
//! - The deterministic movement step (`apply`) shared by prediction,
//!   authoritative simulation, and replay
//! - Move capture: sequence numbering and per-tick input coalescing
//! - Fixed-interval timing for the authority cadence
//! - A seeded RNG for reproducible network emulation
//!
//! Nothing here performs I/O. The netcode crate builds the roles on top.

mod capture;
mod error;
mod identity;
mod movement;
mod msg;
mod pose;
mod rng;
pub mod time;

pub use capture::{AxisInput, InputAccumulator, MoveSequencer};
pub use error::{Error, Result};
pub use identity::EntityId;
pub use movement::{apply, apply_all, MovementConfig};
pub use msg::{Ack, Move};
pub use pose::{lerp_angle, Pose};
pub use rng::SimRng;
pub use time::{IntervalTimer, Tick};

// Re-export the vector type used throughout the public API
pub use glam::Vec3;
