//! Cluster models

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A destination cluster registered with Argo CD.
///
/// Only the fields the server inspects are typed; everything else the API
/// returns (connection state, server version, info, ...) is kept in `extra`
/// so listings stay faithful to the upstream payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Kubernetes API server URL
    pub server: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Project the cluster is scoped to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Namespaces Argo CD may manage (empty means all)
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub namespaces: Vec<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    /// Remaining upstream fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// The API sends `null` for empty collections
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Cluster {
    /// Minimal cluster record, mostly useful for fixtures.
    #[cfg(test)]
    pub fn new(name: &str, server: &str) -> Self {
        Self {
            server: server.to_string(),
            name: name.to_string(),
            project: None,
            namespaces: Vec::new(),
            labels: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}
