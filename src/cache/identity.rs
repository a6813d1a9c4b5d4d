//! Persisted upstream identity, used to detect a server switch between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Identity record file name inside the state directory
pub const SERVER_CONFIG_FILE: &str = "server_config.json";

/// The upstream server a previous run was configured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerIdentity {
    #[serde(alias = "server")]
    pub endpoint: String,
    pub saved_at: DateTime<Utc>,
}

/// Reads and writes the identity record in a state directory.
///
/// Only touched while the cache context is being built, so it needs no lock.
#[derive(Debug, Clone)]
pub struct IdentityTracker {
    path: PathBuf,
}

impl IdentityTracker {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(SERVER_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved identity.
    ///
    /// `None` for a first run (no file) as well as for unreadable or corrupt
    /// files; the latter are logged.
    pub fn load(&self) -> Option<ServerIdentity> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read server identity file: {}", e);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!("Failed to decode server identity file: {}", e);
                None
            }
        }
    }

    /// True iff an identity was saved and differs from `current`.
    ///
    /// Missing or broken records count as unchanged.
    pub fn has_changed(&self, current: &str) -> bool {
        self.load()
            .is_some_and(|identity| identity.endpoint != current)
    }

    /// Record `current` as the active identity, replacing any prior record.
    pub fn save(&self, current: &str) -> Result<(), CacheError> {
        let identity = ServerIdentity {
            endpoint: current.to_string(),
            saved_at: Utc::now(),
        };

        let data = serde_json::to_vec_pretty(&identity)
            .map_err(|e| CacheError::Encode(e.to_string()))?;
        std::fs::write(&self.path, data).map_err(|e| {
            CacheError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}
