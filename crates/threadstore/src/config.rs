use serde::{Deserialize, Serialize};
use threadstore_types::Expiry;

use crate::error::ConfigError;

/// What happens to the expiry of an address that is added again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlRefresh {
    /// Keep whichever of the existing and new expiry is later.
    #[default]
    KeepLater,
    /// The most recent add wins, even if it shortens the lifetime.
    Replace,
}

impl TtlRefresh {
    /// The expiry an existing entry ends up with after a re-add.
    pub fn resolve(self, existing: Expiry, incoming: Expiry) -> Expiry {
        match self {
            Self::KeepLater => existing.max(incoming),
            Self::Replace => incoming,
        }
    }
}

/// Configuration for a threadstore.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadstoreConfig {
    /// Expiry policy when an already-known address is added again.
    pub ttl_refresh: TtlRefresh,
}

impl ThreadstoreConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
