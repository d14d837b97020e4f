//! Netmove Hub - Authority host for replicated entities
//!
//! This crate runs the authority side of a session: one
//! [`Authority`](netmove_netcode::Authority) per hosted entity, all driven
//! by a single interval clock.
//!
//! ## Architecture
//!
//! ```text
//! Hub (owns the interval clock)
//!  │
//!  ├── EntityId → Authority   ← moves routed by envelope entity
//!  │    └── Move queue + authoritative Pose
//!  │
//!  └── on each boundary: one Ack per entity
//! ```
//!
//! ## Key Components
//!
//! - [`Hub`]: Routes moves and emits acks
//! - [`HubConfig`]: Shared netcode settings and the entity limit

mod config;
mod error;
mod hub;

pub use config::HubConfig;
pub use error::{Error, Result};
pub use hub::Hub;
