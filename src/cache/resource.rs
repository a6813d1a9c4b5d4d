//! Per-resource-type cache: an in-memory entry mirrored to one JSON file.
//!
//! One read-write lock guards both the in-memory entry and its file. Network
//! fetches run outside the lock so readers keep getting the previous value
//! while a refresh is in flight. Concurrent misses may each trigger a fetch;
//! they are not coalesced.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};

use super::CachedResource;
use super::entry::CacheEntry;
use crate::client::ArgoApi;
use crate::error::{CacheError, Error, Result};

type Slot<T> = Option<Arc<CacheEntry<T>>>;

/// What `load_from_disk` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid file was adopted without touching the network
    Adopted,
    /// The file was missing or expired and a fresh fetch succeeded
    Refreshed,
    /// The file was missing or expired and the fetch failed; cache left empty
    RefreshFailed,
    /// The file could not be decoded; cache left empty until first use
    Corrupt,
}

enum DiskState {
    Adopted,
    Missing,
    Expired,
    Corrupt,
}

/// TTL cache for one collection of upstream records.
pub struct ResourceCache<T> {
    entry: RwLock<Slot<T>>,
    ttl: Duration,
    path: PathBuf,
    api: Arc<dyn ArgoApi>,
}

impl<T: CachedResource> ResourceCache<T> {
    pub fn new(state_dir: &Path, ttl: Duration, api: Arc<dyn ArgoApi>) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
            path: state_dir.join(T::CACHE_FILE),
            api,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entry, or `None` when absent or expired.
    ///
    /// Expired entries are left in place; only `invalidate` removes them.
    pub fn get(&self) -> Option<Arc<CacheEntry<T>>> {
        let slot = self.read_slot();
        let entry = slot.as_ref()?;
        if !entry.is_valid() {
            return None;
        }
        Some(Arc::clone(entry))
    }

    /// Replace the entry with `items`, valid for `ttl` from now.
    ///
    /// The file is written under the same lock. A failed write is logged and
    /// the in-memory entry stays authoritative.
    pub fn set(&self, items: Vec<T>, ttl: Duration) {
        let entry = Arc::new(CacheEntry::new(items, Utc::now(), ttl));

        let mut slot = self.write_slot();
        *slot = Some(Arc::clone(&entry));

        if let Err(e) = self.write_file(&entry) {
            warn!("Failed to write {} cache to disk: {}", T::KIND, e);
        }
    }

    /// Drop the entry and delete its file. Idempotent.
    pub fn invalidate(&self) {
        let mut slot = self.write_slot();
        *slot = None;
        self.remove_file();
    }

    /// Fetch from upstream and replace the entry.
    ///
    /// On failure the current entry (if any) is untouched and the upstream
    /// error is returned wrapped with the resource kind.
    pub async fn refresh(&self) -> Result<()> {
        info!("Fetching fresh {} data from Argo CD", T::KIND);

        let items = T::fetch(self.api.as_ref()).await.map_err(|e| {
            warn!("Failed to fetch {} data: {}", T::KIND, e);
            Error::refresh(T::KIND, e)
        })?;

        info!("Fetched {} {} records from Argo CD", items.len(), T::KIND);
        self.set(items, self.ttl);
        Ok(())
    }

    /// Serve from memory, fetching only on a miss.
    ///
    /// Dropping the future cancels an in-flight fetch; wrap the call in
    /// `tokio::time::timeout` to bound it. A cancelled fetch leaves the cache
    /// as it was.
    pub async fn get_or_refresh(&self) -> Result<Arc<CacheEntry<T>>> {
        if let Some(entry) = self.get() {
            debug!("Cache hit: {} ({} items)", T::KIND, entry.items.len());
            return Ok(entry);
        }

        info!("Cache miss: {}, refreshing from Argo CD", T::KIND);
        self.refresh().await?;

        self.get()
            .ok_or_else(|| CacheError::EmptyAfterRefresh(T::KIND).into())
    }

    /// Startup load: adopt a valid file, otherwise fetch.
    ///
    /// A corrupt file is logged and left for the next `set` to overwrite.
    pub async fn load_from_disk(&self) -> LoadOutcome {
        match self.adopt_file() {
            DiskState::Adopted => {
                info!("Loaded {} cache from {}", T::KIND, self.path.display());
                return LoadOutcome::Adopted;
            }
            DiskState::Corrupt => return LoadOutcome::Corrupt,
            DiskState::Missing => info!("No {} cache found, fetching fresh data", T::KIND),
            DiskState::Expired => info!("{} cache expired, fetching fresh data", T::KIND),
        }

        match self.refresh().await {
            Ok(()) => LoadOutcome::Refreshed,
            Err(e) => {
                warn!("Failed to refresh {} cache on startup: {}", T::KIND, e);
                LoadOutcome::RefreshFailed
            }
        }
    }

    /// Read the file under the write lock and adopt it if still valid.
    fn adopt_file(&self) -> DiskState {
        let mut slot = self.write_slot();

        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to read {} cache file: {}", T::KIND, e);
                }
                return DiskState::Missing;
            }
        };

        let entry = match CacheEntry::<T>::decode(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring {} cache file: {}", T::KIND, e);
                return DiskState::Corrupt;
            }
        };

        if !entry.is_valid() {
            self.remove_file();
            return DiskState::Expired;
        }

        *slot = Some(Arc::new(entry));
        DiskState::Adopted
    }

    // Caller must hold the write lock.
    fn write_file(&self, entry: &CacheEntry<T>) -> std::result::Result<(), CacheError> {
        let data = entry.encode()?;
        std::fs::write(&self.path, data).map_err(|e| {
            CacheError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    // Caller must hold the write lock.
    fn remove_file(&self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            warn!("Failed to remove {} cache file: {}", T::KIND, e);
        }
    }

    // The slot is only ever replaced wholesale, so a poisoned lock still
    // holds a consistent value.
    fn read_slot(&self) -> RwLockReadGuard<'_, Slot<T>> {
        self.entry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Slot<T>> {
        self.entry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Type-erased view of a resource cache, for operations that span every
/// registered resource type.
#[async_trait]
pub trait ManagedCache: Send + Sync {
    fn kind(&self) -> &'static str;

    fn invalidate(&self);

    async fn load_from_disk(&self) -> LoadOutcome;
}

#[async_trait]
impl<T: CachedResource> ManagedCache for ResourceCache<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn invalidate(&self) {
        ResourceCache::invalidate(self)
    }

    async fn load_from_disk(&self) -> LoadOutcome {
        ResourceCache::load_from_disk(self).await
    }
}
