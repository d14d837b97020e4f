//! Netcode configuration
//!
//! One [`NetConfig`] is shared by all three roles so that the controller,
//! the authority and the observers agree on movement tunables and cadence.
//! Configs are plain serde structs and load from RON.

use crate::{Error, OrientationPolicy, Result};
use netmove_core::MovementConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for every netcode role
///
/// # Example
///
/// ```
/// use netmove_netcode::{NetConfig, OrientationPolicy};
///
/// let config = NetConfig::from_ron_str("(authority_interval_ms: 50)").unwrap();
/// assert_eq!(config.authority_interval_ms, 50);
/// assert_eq!(config.orientation_policy, OrientationPolicy::Overwrite);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Movement tunables, identical on every peer
    pub movement: MovementConfig,
    /// Authority simulation interval in milliseconds
    pub authority_interval_ms: u64,
    /// Observer interpolation interval; `None` follows the authority interval
    pub interpolation_interval_ms: Option<u64>,
    /// How the controller treats its look direction during reconciliation
    pub orientation_policy: OrientationPolicy,
    /// Bound on moves an authority queues per interval, `None` for unbounded
    pub max_pending_moves: Option<usize>,
    /// Maximum samples an observer buffers before skipping ahead
    pub max_interpolation_samples: usize,
    /// Corrections larger than this are logged as warnings
    pub snap_warn_distance: f32,
}

impl NetConfig {
    /// Parse a config from RON text; missing fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: NetConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Check every field is usable
    pub fn validate(&self) -> Result<()> {
        self.movement.validate()?;
        if self.authority_interval_ms == 0 {
            return Err(Error::Config("authority_interval_ms must be positive".into()));
        }
        if self.interpolation_interval_ms == Some(0) {
            return Err(Error::Config(
                "interpolation_interval_ms must be positive".into(),
            ));
        }
        if self.max_pending_moves == Some(0) {
            return Err(Error::Config("max_pending_moves must be positive".into()));
        }
        if self.max_interpolation_samples < 2 {
            return Err(Error::Config(
                "max_interpolation_samples must hold at least two samples".into(),
            ));
        }
        Ok(())
    }

    /// Authority interval as a duration
    pub fn authority_interval(&self) -> Duration {
        Duration::from_millis(self.authority_interval_ms)
    }

    /// Observer interpolation interval as a duration
    pub fn interpolation_interval(&self) -> Duration {
        Duration::from_millis(
            self.interpolation_interval_ms
                .unwrap_or(self.authority_interval_ms),
        )
    }
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            authority_interval_ms: 100,
            interpolation_interval_ms: None,
            orientation_policy: OrientationPolicy::default(),
            max_pending_moves: Some(256),
            max_interpolation_samples: 8,
            snap_warn_distance: 5.0,
        }
    }
}
