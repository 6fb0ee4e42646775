//! In-memory package metadata cache
//!
//! Each package name maps to one shared fetch. The first caller starts the
//! fetch; every later caller (including concurrent ones) awaits the same
//! result, failures included. Entries live until the eviction policy says
//! otherwise, which by default is never.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::version::types::PackageMetadata;

/// Outcome of a metadata fetch; `None` covers every failure
pub type FetchResult = Option<Arc<PackageMetadata>>;

/// A fetch that any number of callers can await
pub type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Source of the current time, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// When a cached entry stops being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep entries (and failures) for the lifetime of the cache
    #[default]
    Never,
    /// Refetch once an entry is older than the given duration
    ExpireAfter(Duration),
}

impl EvictionPolicy {
    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::ExpireAfter(ttl) => now.saturating_duration_since(inserted_at) >= *ttl,
        }
    }
}

/// Counters for asserting cache behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheEntry {
    fetch: SharedFetch,
    inserted_at: Instant,
}

pub struct MetadataCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    policy: EvictionPolicy,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::with_policy(Arc::new(SystemClock), EvictionPolicy::Never)
    }

    pub fn with_policy(clock: Arc<dyn Clock>, policy: EvictionPolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Entries are write-once per key, so a poisoned lock still holds consistent data
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the shared fetch for a package, starting it with `fetch` on a miss
    ///
    /// The check and the insert happen under one lock, so concurrent callers for
    /// the same name never start two fetches. The fetch runs on its own task and
    /// completes even if every caller stops waiting.
    pub fn get_or_fetch<F, Fut>(&self, package_name: &str, fetch: F) -> SharedFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        if let Some(entry) = entries.get(package_name) {
            if !self.policy.is_expired(entry.inserted_at, now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.fetch.clone();
            }
            debug!("Cache entry expired for {}", package_name);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        let handle = tokio::spawn(fetch());
        let name = package_name.to_string();
        let shared = async move {
            handle
                .await
                .inspect_err(|e| warn!("Metadata fetch task for {} failed: {}", name, e))
                .ok()
                .flatten()
        }
        .boxed()
        .shared();

        entries.insert(
            package_name.to_string(),
            CacheEntry {
                fetch: shared.clone(),
                inserted_at: now,
            },
        );

        shared
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
