//! Query Cache for research responses
//!
//! Memoizes extracted [`ResearchResponse`] payloads keyed by the normalized
//! query text, so repeated questions skip the fetch and generation stages.
//!
//! # Cache Key Strategy
//!
//! Keys are the query lowercased and trimmed of surrounding whitespace.
//! Internal whitespace is preserved, so `"graph  networks"` and
//! `"graph networks"` are different queries.
//!
//! # Expiration
//!
//! Expiry is lazy: an entry whose age has reached the configured TTL is
//! treated as absent and evicted by the `get` that observes it.
//! [`InMemoryResponseCache::cleanup_expired`] can be called to sweep eagerly.
//!
//! # Example
//!
//! ```ignore
//! use scholar::research::cache::{CacheConfig, InMemoryResponseCache, ResponseCache};
//!
//! let cache = InMemoryResponseCache::new(CacheConfig::default());
//! cache.put("Transformers ", response.clone());
//! assert_eq!(cache.get("transformers"), Some(response));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::types::{CacheStatsResponse, ResearchResponse};

// ============================================================================
// Cache Types
// ============================================================================

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of live (unexpired) entries
    pub entry_count: usize,
    /// Number of cache hits
    pub hit_count: u64,
    /// Number of cache misses, expired reads included
    pub miss_count: u64,
    /// Entries removed to respect `max_entries`
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            (self.hit_count as f64 / total as f64) * 100.0
        }
    }
}

/// Configuration for the response cache (`[cache]` in `scholar.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether responses are cached at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Entry time-to-live in seconds (default: one hour)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Upper bound on stored entries (None = unbounded)
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Normalize a query into its cache identity.
///
/// Lowercases and trims leading/trailing whitespace. Idempotent.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

// ============================================================================
// Cache Trait
// ============================================================================

/// Storage for extracted research responses.
///
/// Every method normalizes its query argument, so callers may pass raw
/// user text. Each call is atomic with respect to the others.
pub trait ResponseCache: Send + Sync {
    /// Look up a live entry. Expired entries are evicted and reported absent.
    fn get(&self, query: &str) -> Option<ResearchResponse>;

    /// Store a response, replacing any existing entry for the same key.
    fn put(&self, query: &str, response: ResearchResponse);

    /// Remove every entry, returning how many were removed.
    fn clear(&self) -> usize;

    /// Get cache statistics
    fn stats(&self) -> CacheStats;

    /// Configured time-to-live
    fn ttl(&self) -> Duration;

    /// Check if the cache is enabled
    fn is_enabled(&self) -> bool;

    /// Stats in the shape served over HTTP.
    fn stats_response(&self) -> CacheStatsResponse {
        let stats = self.stats();
        CacheStatsResponse {
            entry_count: stats.entry_count,
            hit_count: stats.hit_count,
            miss_count: stats.miss_count,
            hit_rate: stats.hit_rate(),
            ttl_secs: self.ttl().as_secs(),
            enabled: self.is_enabled(),
        }
    }
}

// ============================================================================
// Cache Entry
// ============================================================================

/// A stored response. Never mutated; overwrites replace the whole entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    response: ResearchResponse,
    /// Monotonic creation time used for expiry
    created_at: Instant,
    /// Wall-clock creation time, for logs
    created_wall: DateTime<Utc>,
}

impl CacheEntry {
    fn new(response: ResearchResponse) -> Self {
        Self {
            response,
            created_at: Instant::now(),
            created_wall: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

// ============================================================================
// In-Memory Response Cache
// ============================================================================

/// In-memory TTL cache guarded by `parking_lot::RwLock`.
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemoryResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig {
            ttl_secs: ttl.as_secs(),
            ..Default::default()
        })
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let ttl = self.config.ttl();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until evicted.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop expired entries, then the oldest ones, until there is room for one more.
    fn make_room(&self, entries: &mut HashMap<String, CacheEntry>, max_entries: usize) {
        let ttl = self.config.ttl();
        entries.retain(|_, entry| !entry.is_expired(ttl));

        while entries.len() >= max_entries && !entries.is_empty() {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());

            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                None => break,
            }
        }
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, query: &str) -> Option<ResearchResponse> {
        if !self.config.enabled {
            return None;
        }

        let key = normalize_query(query);
        let ttl = self.config.ttl();

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if !entry.is_expired(ttl) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.response.clone());
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired: evict under the write lock, unless a fresh put raced in.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(&key) {
            if !entry.is_expired(ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.response.clone());
            }
            tracing::debug!(
                key = %key,
                created = %entry.created_wall,
                "Evicting expired cache entry"
            );
            entries.remove(&key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, query: &str, response: ResearchResponse) {
        if !self.config.enabled {
            return;
        }

        let key = normalize_query(query);
        let mut entries = self.entries.write();

        if let Some(max_entries) = self.config.max_entries {
            if !entries.contains_key(&key) && entries.len() >= max_entries {
                self.make_room(&mut entries, max_entries);
            }
        }

        entries.insert(key, CacheEntry::new(response));
    }

    fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    fn stats(&self) -> CacheStats {
        let ttl = self.config.ttl();
        let entry_count = self
            .entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(ttl))
            .count();

        CacheStats {
            entry_count,
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

// ============================================================================
// No-Op Cache
// ============================================================================

/// A cache that stores nothing; every lookup is a miss.
#[derive(Debug, Default)]
pub struct NoOpCache {
    misses: AtomicU64,
}

impl NoOpCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseCache for NoOpCache {
    fn get(&self, _query: &str) -> Option<ResearchResponse> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, _query: &str, _response: ResearchResponse) {}

    fn clear(&self) -> usize {
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            miss_count: self.misses.load(Ordering::Relaxed),
            ..Default::default()
        }
    }

    fn ttl(&self) -> Duration {
        Duration::ZERO
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Build the cache described by `config`.
pub fn from_config(config: &CacheConfig) -> std::sync::Arc<dyn ResponseCache> {
    if config.enabled {
        std::sync::Arc::new(InMemoryResponseCache::new(config.clone()))
    } else {
        std::sync::Arc::new(NoOpCache::new())
    }
}

// ============================================================================
// Tests
// ============================================================================
