//! Argo CD API client

use async_trait::async_trait;

use crate::error::Result;

pub mod argocd;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use argocd::ArgoCdClient;
#[cfg(test)]
pub use mock::MockArgoClient;
pub use models::{Application, Cluster};

/// Upstream inventory capability consumed by the caches.
///
/// Implementations talk to a (slow, rate-limited) Argo CD server. Callers
/// cancel an in-flight fetch by dropping its future.
#[async_trait]
pub trait ArgoApi: Send + Sync {
    /// List every cluster registered with Argo CD
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// List every application visible to the API token
    async fn list_applications(&self) -> Result<Vec<Application>>;
}
