//! Local cache for Argo CD inventory
//!
//! One [`ResourceCache`] per resource type, each holding an in-memory entry
//! mirrored to a JSON file in the state directory. [`CacheContext`] ties them
//! together with the [`IdentityTracker`] that wipes everything when the
//! configured server changes between runs.

pub mod context;
pub mod entry;
pub mod identity;
pub mod resource;

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{Application, ArgoApi, Cluster};
use crate::error::Result;

/// Default cache TTL per resource type
pub struct CacheTtl;

impl CacheTtl {
    // Cluster registrations rarely change
    pub const CLUSTERS: Duration = Duration::from_secs(60 * 60); // 1 hr
    pub const APPLICATIONS: Duration = Duration::from_secs(60 * 60); // 1 hr
}

/// A record type that gets its own cache and cache file.
pub trait CachedResource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Short name used in logs and errors
    const KIND: &'static str;

    /// File name inside the state directory
    const CACHE_FILE: &'static str;

    /// Fetch the full collection from upstream
    fn fetch(api: &dyn ArgoApi) -> BoxFuture<'_, Result<Vec<Self>>>;
}

impl CachedResource for Cluster {
    const KIND: &'static str = "cluster";
    const CACHE_FILE: &'static str = "cluster_cache.json";

    fn fetch(api: &dyn ArgoApi) -> BoxFuture<'_, Result<Vec<Self>>> {
        api.list_clusters()
    }
}

impl CachedResource for Application {
    const KIND: &'static str = "application";
    const CACHE_FILE: &'static str = "application_cache.json";

    fn fetch(api: &dyn ArgoApi) -> BoxFuture<'_, Result<Vec<Self>>> {
        api.list_applications()
    }
}

// Re-export main types
pub use context::CacheContext;
pub use entry::CacheEntry;
pub use identity::IdentityTracker;
pub use resource::{LoadOutcome, ResourceCache};
