//! Hub Configuration - Netcode settings and entity limits
//!
//! Every entity the hub hosts shares one [`NetConfig`], so the hub owns it
//! and hands it to each [`Authority`](netmove_netcode::Authority) it spawns.

use crate::error::Result;
use netmove_netcode::NetConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a [`Hub`](crate::Hub)
///
/// # Example
///
/// ```
/// use netmove_hub::HubConfig;
///
/// let config = HubConfig::from_ron_str("(max_entities: Some(4))").unwrap();
/// assert_eq!(config.max_entities, Some(4));
/// assert_eq!(config.net.authority_interval_ms, 100);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Netcode settings shared by every hosted entity
    pub net: NetConfig,
    /// Upper bound on hosted entities, `None` for unbounded
    pub max_entities: Option<usize>,
}

impl HubConfig {
    /// Parse a config from RON text; missing fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: HubConfig = ron::from_str(content)?;
        config.net.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(netmove_netcode::Error::from)?;
        Self::from_ron_str(&content)
    }

    /// Check whether another entity fits
    pub fn has_room(&self, hosted: usize) -> bool {
        self.max_entities.map_or(true, |max| hosted < max)
    }
}
