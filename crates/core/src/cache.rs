//! TTL cache for computed digest content.
//!
//! Keys are `<kind>:<tag>` strings (`trends:global`, `summary:brasil`).
//! Freshness windows are kind-specific and injected through [`CacheConfig`].
//! Expiry is lazy: an entry older than its window is removed on the next
//! lookup and treated as absent. The principal correctness contract is
//! in-flight deduplication: at most one computation per key runs
//! process-wide, and every concurrent caller for that key receives the
//! single outcome — success or the same failure.

use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Error, Result, ValidationErrorCode};

/// Tag used when a content request does not disambiguate further.
pub const DEFAULT_CONTENT_TAG: &str = "global";

/// The kinds of computed content the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Trends,
    Topics,
    Summary,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trends => "trends",
            Self::Topics => "topics",
            Self::Summary => "summary",
        }
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trends" => Ok(Self::Trends),
            "topics" => Ok(Self::Topics),
            "summary" => Ok(Self::Summary),
            other => Err(Error::UnknownContentKind(other.to_string())),
        }
    }
}

/// Kind-specific freshness windows, configured externally.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub trends_ttl: Duration,
    pub topics_ttl: Duration,
    pub summary_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            trends_ttl: Duration::from_secs(300),
            topics_ttl: Duration::from_secs(600),
            summary_ttl: Duration::from_secs(900),
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, kind: ContentKind) -> Duration {
        match kind {
            ContentKind::Trends => self.trends_ttl,
            ContentKind::Topics => self.topics_ttl,
            ContentKind::Summary => self.summary_ttl,
        }
    }
}

/// A cache read within the freshness window.
#[derive(Debug, Clone)]
pub struct CachedContent {
    pub payload: serde_json::Value,
    pub computed_at: DateTime<Utc>,
}

/// Point-in-time cache statistics.
///
/// `hits`, `misses` and `evictions` are monotonic since process start and
/// are never reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inflight: u64,
    pub entries: u64,
    pub evictions: u64,
}

struct StoredEntry {
    payload: serde_json::Value,
    computed_at: Instant,
    stored_at: DateTime<Utc>,
}

/// Outcome shared between all callers of one in-flight computation.
type ComputeOutcome = std::result::Result<serde_json::Value, String>;

/// Keyed TTL cache with in-flight deduplication.
pub struct ContentCache {
    entries: Mutex<HashMap<String, StoredEntry>>,
    inflight: Mutex<HashMap<String, watch::Receiver<Option<ComputeOutcome>>>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ContentCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Canonical key for a kind/tag pair.
    pub fn key(kind: ContentKind, tag: &str) -> String {
        format!("{}:{}", kind.as_str(), tag)
    }

    /// Fresh-entry lookup. Expired entries are removed and count as misses.
    pub fn get(&self, kind: ContentKind, tag: &str) -> Option<CachedContent> {
        let key = Self::key(kind, tag);
        match self.lookup(&key) {
            Some(found) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(found)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a payload under the kind/tag key with a timestamp of now,
    /// overwriting any previous entry.
    pub fn set(&self, kind: ContentKind, tag: &str, payload: serde_json::Value) {
        let entry = StoredEntry {
            payload,
            computed_at: Instant::now(),
            stored_at: Utc::now(),
        };
        self.entries.lock().insert(Self::key(kind, tag), entry);
    }

    /// Returns the cached payload, or runs `compute` ensuring at most one
    /// concurrent computation per key.
    ///
    /// Concurrent callers during an in-flight computation all receive that
    /// computation's outcome. Failures are shared but not cached: the next
    /// caller after settlement computes afresh. A computation is never
    /// cancelled by this layer — it may complete and populate the cache
    /// after every original waiter is gone.
    pub async fn get_or_compute<F>(
        &self,
        kind: ContentKind,
        tag: &str,
        compute: F,
    ) -> Result<serde_json::Value>
    where
        F: Future<Output = Result<serde_json::Value>>,
    {
        if let Some(found) = self.get(kind, tag) {
            return Ok(found.payload);
        }

        let key = Self::key(kind, tag);

        // Check-then-create of the in-flight marker happens under one lock:
        // two callers must never both observe a miss and both compute.
        enum Role {
            Leader(watch::Sender<Option<ComputeOutcome>>),
            Waiter(watch::Receiver<Option<ComputeOutcome>>),
        }

        let role = {
            let mut inflight = self.inflight.lock();
            if let Some(found) = self.lookup(&key) {
                return Ok(found.payload);
            }
            match inflight.get(&key).cloned() {
                Some(rx) => Role::Waiter(rx),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(key.clone(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                let guard = InflightGuard {
                    cache: self,
                    key,
                    tx: Some(tx),
                };
                let outcome = compute.await;
                if let Ok(payload) = &outcome {
                    self.set(kind, tag, payload.clone());
                }
                let shared = outcome
                    .as_ref()
                    .map(Clone::clone)
                    .map_err(ToString::to_string);
                guard.complete(shared);
                outcome
            }
            Role::Waiter(mut rx) => loop {
                let settled = rx.borrow_and_update().clone();
                if let Some(outcome) = settled {
                    return outcome.map_err(Error::internal);
                }
                if rx.changed().await.is_err() {
                    return Err(Error::internal("content computation abandoned"));
                }
            },
        }
    }

    /// Removes the named keys and/or every key starting with `prefix`.
    ///
    /// Rejects before mutating state when neither is given. Returns the
    /// number of entries actually removed; a key matched by both selectors
    /// counts once.
    pub fn invalidate(&self, keys: Option<&[String]>, prefix: Option<&str>) -> Result<usize> {
        if keys.is_none() && prefix.is_none() {
            return Err(Error::validation_code(
                ValidationErrorCode::EmptyInvalidation,
                "invalidation requires keys or a prefix",
            ));
        }

        let mut entries = self.entries.lock();
        let mut removed = 0;
        if let Some(keys) = keys {
            for key in keys {
                if entries.remove(key).is_some() {
                    removed += 1;
                }
            }
        }
        if let Some(prefix) = prefix {
            let matching: Vec<String> = entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            for key in matching {
                entries.remove(&key);
                removed += 1;
            }
        }
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        Ok(removed)
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inflight: self.inflight.lock().len() as u64,
            entries: self.entries.lock().len() as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Removes every entry past its freshness window; memory hygiene only.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let config = &self.config;
        entries.retain(|key, entry| entry.computed_at.elapsed() <= ttl_for_key(config, key));
        let removed = before - entries.len();
        self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    fn lookup(&self, key: &str) -> Option<CachedContent> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.computed_at.elapsed() > ttl_for_key(&self.config, key) {
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(CachedContent {
            payload: entry.payload.clone(),
            computed_at: entry.stored_at,
        })
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, age: Duration) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.computed_at = Instant::now().checked_sub(age).unwrap();
        }
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

fn ttl_for_key(config: &CacheConfig, key: &str) -> Duration {
    key.split(':')
        .next()
        .and_then(|kind| ContentKind::from_str(kind).ok())
        .map(|kind| config.ttl_for(kind))
        .unwrap_or(config.trends_ttl)
}

/// Settles the in-flight marker exactly once, even if the computing caller
/// is dropped mid-flight: waiters then observe a cancellation failure
/// instead of hanging on a marker nobody will release.
struct InflightGuard<'a> {
    cache: &'a ContentCache,
    key: String,
    tx: Option<watch::Sender<Option<ComputeOutcome>>>,
}

impl InflightGuard<'_> {
    fn complete(mut self, outcome: ComputeOutcome) {
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: ComputeOutcome) {
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome));
            self.cache.inflight.lock().remove(&self.key);
        }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.settle(Err("content computation cancelled".to_string()));
        }
    }
}
