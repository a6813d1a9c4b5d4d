//! Cache context: startup reconciliation and the read path used by handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};

use super::entry::CacheEntry;
use super::identity::IdentityTracker;
use super::resource::{ManagedCache, ResourceCache};
use super::CachedResource;
use crate::client::{Application, ArgoApi, Cluster};
use crate::config::CacheSettings;
use crate::error::Result;

/// Shared cache state handed to every request handler.
///
/// Built once, before any handler runs; the identity file is never touched
/// afterwards.
pub struct CacheContext {
    endpoint: String,
    state_dir: PathBuf,
    identity: IdentityTracker,
    clusters: ResourceCache<Cluster>,
    applications: ResourceCache<Application>,
}

impl CacheContext {
    /// Build the context and reconcile persisted state.
    ///
    /// If the server identity differs from the previous run every cache is
    /// invalidated. Each cache then adopts its file or fetches fresh data.
    /// Failures along the way are logged, never returned: a cache that could
    /// not be populated is filled on first use instead.
    pub async fn new(api: Arc<dyn ArgoApi>, endpoint: &str, settings: &CacheSettings) -> Self {
        let state_dir = settings.state_dir.clone();
        if let Err(e) = std::fs::create_dir_all(&state_dir) {
            warn!("Failed to create state directory {}: {}", state_dir.display(), e);
        }

        let ctx = Self {
            endpoint: endpoint.to_string(),
            identity: IdentityTracker::new(&state_dir),
            clusters: ResourceCache::new(&state_dir, settings.cluster_ttl, Arc::clone(&api)),
            applications: ResourceCache::new(&state_dir, settings.application_ttl, api),
            state_dir,
        };

        if ctx.identity.has_changed(endpoint) {
            info!("Argo CD server has changed to {}, invalidating all caches", endpoint);
            ctx.invalidate_all();
        }

        if let Err(e) = ctx.identity.save(endpoint) {
            warn!("Failed to save server identity: {}", e);
        }

        let caches = ctx.caches();
        let outcomes = join_all(caches.iter().map(|cache| cache.load_from_disk())).await;
        for (cache, outcome) in caches.iter().zip(outcomes) {
            debug!("Startup load of {} cache: {:?}", cache.kind(), outcome);
        }

        ctx
    }

    /// Server identity this context was built for
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn clusters(&self) -> &ResourceCache<Cluster> {
        &self.clusters
    }

    pub fn applications(&self) -> &ResourceCache<Application> {
        &self.applications
    }

    pub async fn get_or_refresh_clusters(&self) -> Result<Arc<CacheEntry<Cluster>>> {
        self.clusters.get_or_refresh().await
    }

    pub async fn get_or_refresh_applications(&self) -> Result<Arc<CacheEntry<Application>>> {
        self.applications.get_or_refresh().await
    }

    /// Invalidate every registered cache, returning their kinds
    pub fn invalidate_all(&self) -> Vec<&'static str> {
        self.caches()
            .iter()
            .map(|cache| {
                cache.invalidate();
                cache.kind()
            })
            .collect()
    }

    /// Every registered cache
    pub fn caches(&self) -> [&dyn ManagedCache; 2] {
        [&self.clusters, &self.applications]
    }

    /// Cache file names of every registered resource type
    pub fn cache_files() -> [(&'static str, &'static str); 2] {
        [
            (Cluster::KIND, Cluster::CACHE_FILE),
            (Application::KIND, Application::CACHE_FILE),
        ]
    }
}
