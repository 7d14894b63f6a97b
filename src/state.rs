//! Shared state: loaded indices, in-flight loads and the active index.
//!
//! Loaded indices are immutable and handed out as `Arc`s. A rebuilt payload is
//! loaded as a new index and swapped in whole; nothing is patched in place.

use crate::config::Config;
use crate::fingerprint::Fingerprint;
use crate::index::SearchIndex;
use crate::search::TermIndex;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tokio::time::{Duration, interval};

/// Maximum number of parsed indices to keep in memory.
const LRU_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(50).expect("cache size is non-zero");

/// Type alias for shared load futures.
type SharedLoadFuture = Shared<BoxFuture<'static, Result<Arc<LoadedIndex>, String>>>;

/// A parsed payload plus its lazily built keyword index.
#[derive(Debug)]
pub struct LoadedIndex {
    pub index: SearchIndex,
    terms: OnceCell<TermIndex>,
}

impl LoadedIndex {
    pub const fn new(index: SearchIndex) -> Self {
        Self {
            index,
            terms: OnceCell::const_new(),
        }
    }

    /// The keyword index, built (or read from `cache_dir`) on first use.
    pub async fn terms(&self, cache_dir: Option<&Path>) -> &TermIndex {
        self.terms
            .get_or_init(|| TermIndex::load_or_build(&self.index, cache_dir))
            .await
    }
}

/// Central coordination point for index loading.
///
/// - Caching parsed indices by path (LRU), revalidated by fingerprint
/// - Sharing one load between concurrent callers
/// - Tracking which index tools operate on by default
pub struct IndexState {
    cache: Arc<RwLock<LruCache<PathBuf, Arc<LoadedIndex>>>>,
    in_flight: Arc<Mutex<HashMap<PathBuf, SharedLoadFuture>>>,
    active: RwLock<Option<Arc<LoadedIndex>>>,
    config: Config,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("in_flight_count", &self.in_flight.try_lock().map(|m| m.len()).ok())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IndexState {
    pub fn new(config: Config) -> Self {
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(LRU_CACHE_SIZE))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            active: RwLock::new(None),
            config,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Directory for keyword index caches.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.config.cache_dir()
    }

    /// The index tools use when no path is given.
    pub async fn active(&self) -> Option<Arc<LoadedIndex>> {
        self.active.read().await.clone()
    }

    /// Load `path` and make it the active index.
    pub async fn activate(&self, path: &Path) -> Result<Arc<LoadedIndex>, String> {
        let loaded = self.load(path).await?;
        *self.active.write().await = Some(loaded.clone());
        tracing::info!("Active search index: {}", path.display());
        Ok(loaded)
    }

    /// Get the index for `path`, loading it if it is not cached or has changed.
    pub async fn load(&self, path: &Path) -> Result<Arc<LoadedIndex>, String> {
        // 1. Cached and unchanged?
        let cached = self.cache.write().await.get(path).cloned();
        if let Some(loaded) = &cached {
            match Fingerprint::of_file(path).await {
                Ok(current) if current == loaded.index.fingerprint() => {
                    tracing::debug!("Cache hit for {}", path.display());
                    return Ok(loaded.clone());
                }
                Ok(_) => tracing::info!("Search index changed on disk: {}", path.display()),
                Err(e) => tracing::warn!("Cannot re-read {}: {}", path.display(), e),
            }
        }

        // 2. Join the load in flight, or start one. Lookup and insert share one lock.
        let future = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.entry(path.to_path_buf()) {
                MapEntry::Occupied(entry) => {
                    tracing::debug!("Awaiting in-flight load of {}", path.display());
                    entry.get().clone()
                }
                MapEntry::Vacant(entry) => {
                    // A load may have finished between step 1 and taking the lock.
                    let fresh = self
                        .cache
                        .write()
                        .await
                        .get(path)
                        .filter(|loaded| cached.as_ref().is_none_or(|old| !Arc::ptr_eq(old, loaded)))
                        .cloned();
                    if let Some(loaded) = fresh {
                        return Ok(loaded);
                    }
                    entry.insert(self.load_future(path)).clone()
                }
            }
        };

        future.await
    }

    /// A shareable load of `path`.
    ///
    /// The future itself caches the result and clears its in-flight entry, so
    /// a caller dropped mid-load leaves nothing stale behind: the next caller
    /// joins and finishes the same future.
    fn load_future(&self, path: &Path) -> SharedLoadFuture {
        let path = path.to_path_buf();
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);

        let load_future: BoxFuture<'static, Result<Arc<LoadedIndex>, String>> =
            Box::pin(async move {
                let result = SearchIndex::load(&path)
                    .await
                    .map(|index| Arc::new(LoadedIndex::new(index)))
                    .map_err(|e| e.to_string());

                if let Ok(loaded) = &result {
                    cache.write().await.put(path.clone(), loaded.clone());
                    tracing::debug!("Cached index for {}", path.display());
                }
                in_flight.lock().await.remove(&path);

                result
            });

        load_future.shared()
    }

    /// Reload the active index if its payload changed. Returns whether it was replaced.
    pub async fn refresh_active(&self) -> Result<bool, String> {
        let Some(current) = self.active().await else {
            return Ok(false);
        };
        let Some(path) = current.index.path().map(Path::to_path_buf) else {
            return Ok(false);
        };

        let fingerprint = Fingerprint::of_file(&path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        if fingerprint == current.index.fingerprint() {
            return Ok(false);
        }

        let reloaded = self.load(&path).await?;
        let mut active = self.active.write().await;
        // Only swap if nobody activated another index meanwhile.
        if active.as_ref().is_some_and(|a| Arc::ptr_eq(a, &current)) {
            *active = Some(reloaded);
            tracing::info!("Reloaded rebuilt search index {}", path.display());
            return Ok(true);
        }
        Ok(false)
    }

    pub async fn is_cached(&self, path: &Path) -> bool {
        self.cache.read().await.contains(path)
    }

    pub async fn is_loading(&self, path: &Path) -> bool {
        self.in_flight.lock().await.contains_key(path)
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        self.in_flight.lock().await.clear();
    }
}

/// Watches the active payload and swaps in a rebuilt one.
pub struct ReloadWatcher {
    state: Arc<IndexState>,
    period: Duration,
}

impl ReloadWatcher {
    pub const fn new(state: Arc<IndexState>, period: Duration) -> Self {
        Self { state, period }
    }

    /// Run forever, checking once per period.
    pub async fn run(&self) {
        let mut ticker = interval(self.period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.state.refresh_active().await {
                tracing::warn!("Search index reload failed: {}", e);
            }
        }
    }
}

/// Spawn the reload watcher as a tokio task.
pub fn spawn_reload_watcher(
    state: Arc<IndexState>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        ReloadWatcher::new(state, period).run().await;
    })
}
