//! Application models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An Argo CD application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ApplicationSpec,

    /// Sync/health status, passed through as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kubernetes object metadata (subset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Application spec (subset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    /// Owning Argo CD project
    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub destination: Destination,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where an application is deployed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Target cluster API server URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Target namespace in the destination cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Target cluster name (alternative to `server`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Application {
    #[cfg(test)]
    pub fn new(name: &str, namespace: &str, project: &str, server: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: Some(namespace.to_string()),
                extra: Map::new(),
            },
            spec: ApplicationSpec {
                project: project.to_string(),
                destination: Destination {
                    server: Some(server.to_string()),
                    namespace: None,
                    name: None,
                },
                extra: Map::new(),
            },
            status: None,
            extra: Map::new(),
        }
    }
}
