//! Store Engine
//!
//! The single store aggregate: the key→value map, the key→deadline map, the
//! LRU recency list, the running memory estimate, and the dirty counter, all
//! guarded by one reader/writer lock.
//!
//! ## Invariants
//!
//! - Every key in the deadline map exists in the value map.
//! - When caching is enabled and a memory limit is set, every key in the
//!   value map has exactly one position in the recency list and vice versa.
//! - The memory estimate always equals `sum(len(key) + len(value))` over the
//!   live entries. It is maintained incrementally on every mutation and only
//!   recomputed from scratch when a snapshot is loaded.
//! - After any mutation the estimate is at or below the limit, or the
//!   recency list has been drained.
//!
//! The estimate deliberately counts raw key and value bytes only, not the
//! deadline map, the recency slots, or hash-map overhead, so the configured
//! limit is an under-estimate of true process memory.
//!
//! ## Locking
//!
//! Readers that do not touch the recency list take the lock in shared mode;
//! everything else takes it exclusively. There is no shared→exclusive
//! upgrade: read verbs that must record a touch re-acquire the lock in
//! exclusive mode after releasing the shared guard (see the GET handler).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::storage::lru::LruList;
use crate::storage::snapshot::{self, Snapshot};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Deadlines are absolute wall-clock instants so they survive a snapshot
/// round-trip.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// The store aggregate. Lives inside [`StoreEngine`]'s lock; handlers
/// operate on it through a read or write guard.
#[derive(Debug)]
pub struct Store {
    map: HashMap<String, String>,
    ttl: HashMap<String, i64>,
    lru: LruList,
    mem_used: u64,
    dirty: u64,
    limit: u64,
    caching: bool,
}

impl Store {
    fn new(limit: u64, caching: bool) -> Self {
        Self {
            map: HashMap::new(),
            ttl: HashMap::new(),
            lru: LruList::new(),
            mem_used: 0,
            dirty: 0,
            limit,
            caching,
        }
    }

    #[inline]
    fn entry_size(key: &str, value: &str) -> u64 {
        (key.len() + value.len()) as u64
    }

    /// Looks up a value. Does not consult the deadline map: expired keys
    /// stay visible until the background sweep removes them.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// True if the key is present (expired or not).
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts or overwrites a value, adjusting the memory estimate by the
    /// size delta and moving the key to the head of the recency list.
    pub fn insert(&mut self, key: &str, value: String) {
        let new_size = Self::entry_size(key, &value);
        let old_size = self
            .map
            .get(key)
            .map(|old| Self::entry_size(key, old))
            .unwrap_or(0);
        self.map.insert(key.to_owned(), value);
        self.mem_used = self.mem_used + new_size - old_size;
        self.touch(key);
    }

    /// Removes a key from all four structures. Returns `true` if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.map.remove(key) {
            Some(value) => {
                self.mem_used -= Self::entry_size(key, &value);
                self.ttl.remove(key);
                self.lru.remove(key);
                true
            }
            None => false,
        }
    }

    /// Moves the key to the head of the recency list. A no-op when caching
    /// is disabled or no memory limit is configured, and for absent keys.
    pub fn touch(&mut self, key: &str) {
        if !self.caching || self.limit == 0 {
            return;
        }
        if self.map.contains_key(key) {
            self.lru.touch(key);
        }
    }

    /// Returns the absolute deadline for a key, if one is set.
    pub fn deadline(&self, key: &str) -> Option<i64> {
        self.ttl.get(key).copied()
    }

    /// Sets an absolute expiry deadline in milliseconds.
    pub fn set_deadline(&mut self, key: &str, deadline_ms: i64) {
        self.ttl.insert(key.to_owned(), deadline_ms);
    }

    /// Clears any expiry for the key.
    pub fn clear_deadline(&mut self, key: &str) {
        self.ttl.remove(key);
    }

    /// Evicts tail keys while the estimate exceeds the limit. Eviction is
    /// coarse: whole entries go, values are never trimmed. Evictions do not
    /// mark the store dirty. Returns the evicted keys.
    pub fn enforce_memory_limit(&mut self) -> Vec<String> {
        if !self.caching || self.limit == 0 {
            return Vec::new();
        }
        let mut evicted = Vec::new();
        while self.mem_used > self.limit && !self.lru.is_empty() {
            let victim = match self.lru.pop_tail() {
                Some(key) => key,
                None => break,
            };
            if let Some(value) = self.map.remove(&victim) {
                self.mem_used -= Self::entry_size(&victim, &value);
            }
            self.ttl.remove(&victim);
            evicted.push(victim);
        }
        evicted
    }

    /// Removes every key whose deadline is strictly in the past, counting
    /// each removal as a dirty mutation. Returns the swept keys.
    pub fn sweep_expired(&mut self, now_ms: i64) -> Vec<String> {
        let stale: Vec<String> = self
            .ttl
            .iter()
            .filter(|(_, &deadline)| now_ms > deadline)
            .map(|(key, _)| key.clone())
            .collect();
        let mut swept = Vec::with_capacity(stale.len());
        for key in stale {
            if self.remove(&key) {
                self.dirty += 1;
                swept.push(key);
            }
        }
        swept
    }

    /// Drops every entry and resets the memory estimate. Returns the number
    /// of keys that were cleared.
    pub fn clear(&mut self) -> usize {
        let cleared = self.map.len();
        self.map.clear();
        self.ttl.clear();
        self.lru.clear();
        self.mem_used = 0;
        cleared
    }

    /// Counts keys starting with the given prefix.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.map.keys().filter(|k| k.starts_with(prefix)).count()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of keys carrying an expiry deadline.
    pub fn ttl_len(&self) -> usize {
        self.ttl.len()
    }

    /// Current memory estimate in bytes.
    pub fn mem_used(&self) -> u64 {
        self.mem_used
    }

    /// Mutations since the last primary snapshot flush.
    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    /// Records `n` dirty mutations.
    pub fn mark_dirty(&mut self, n: u64) {
        self.dirty += n;
    }

    pub(crate) fn reset_dirty(&mut self) {
        self.dirty = 0;
    }

    /// Number of keys in the recency list. Zero when caching is off.
    pub fn lru_len(&self) -> usize {
        self.lru.len()
    }

    pub(crate) fn entries(&self) -> &HashMap<String, String> {
        &self.map
    }

    pub(crate) fn deadlines(&self) -> &HashMap<String, i64> {
        &self.ttl
    }

    /// Replaces the store contents with a loaded snapshot: rebuilds the
    /// memory estimate by summation, drops deadlines with no matching key,
    /// and seeds the recency list in map iteration order.
    fn absorb(&mut self, snapshot: Snapshot) {
        self.map = snapshot.store;
        self.ttl = snapshot.ttl;
        self.ttl.retain(|key, _| self.map.contains_key(key));
        self.lru.clear();
        self.mem_used = self.map.iter().map(|(k, v)| Self::entry_size(k, v)).sum();
        let keys: Vec<String> = self.map.keys().cloned().collect();
        for key in keys {
            self.touch(&key);
        }
    }
}

/// The shared store engine: one [`Store`] behind one reader/writer lock,
/// plus the snapshot plumbing that every mutation path funnels through.
#[derive(Debug)]
pub struct StoreEngine {
    store: RwLock<Store>,
    settings: Arc<Settings>,
}

impl StoreEngine {
    /// Creates an empty engine configured from the shared settings.
    pub fn new(settings: Arc<Settings>) -> Self {
        let store = Store::new(settings.memory_limit, settings.caching);
        Self {
            store: RwLock::new(store),
            settings,
        }
    }

    /// The settings this engine was built with.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Acquires the store in shared mode, for reads that do not touch the
    /// recency list.
    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read()
    }

    /// Acquires the store exclusively.
    pub fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write()
    }

    /// Non-blocking exclusive acquisition, used by the background manager so
    /// it never stalls active workers.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, Store>> {
        self.store.try_write()
    }

    /// Completes a mutating handler: enforces the memory limit, records the
    /// dirty mutations, and flushes inline when the batch size is 0.
    pub fn commit(&self, store: &mut Store, mutations: u64) {
        for key in store.enforce_memory_limit() {
            debug!(key = %key, "evicted key to stay within memory limit");
        }
        if mutations == 0 {
            return;
        }
        store.mark_dirty(mutations);
        if self.settings.batch_size() == 0 {
            let path = self.settings.db_path.clone();
            self.flush(store, &path);
        }
    }

    /// Writes a snapshot of the given (already locked) store to `path`.
    /// Flushes to the primary database file reset the dirty counter; other
    /// targets (STRESS) leave it untouched. Write failures are logged, not
    /// retried.
    pub fn flush(&self, store: &mut Store, path: &Path) {
        if !self.settings.persistence {
            return;
        }
        match snapshot::save(path, store.entries(), store.deadlines()) {
            Ok(()) => {
                if path == self.settings.db_path {
                    store.reset_dirty();
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "snapshot flush failed"),
        }
    }

    /// Loads the snapshot file at startup. A missing file starts the engine
    /// empty; an unparseable file is logged and the engine starts empty.
    /// Loaded entries are subject to immediate eviction if they exceed the
    /// memory limit.
    pub fn load_from_disk(&self) {
        if !self.settings.persistence {
            return;
        }
        match snapshot::load(&self.settings.db_path) {
            Ok(Some(snap)) => {
                let mut store = self.write();
                store.absorb(snap);
                let evicted = store.enforce_memory_limit();
                info!(
                    keys = store.len(),
                    evicted = evicted.len(),
                    "loaded snapshot into memory"
                );
            }
            Ok(None) => {
                info!(
                    path = %self.settings.db_path.display(),
                    "database file not found, starting empty"
                );
            }
            Err(e) => {
                error!(
                    path = %self.settings.db_path.display(),
                    error = %e,
                    "could not load database file, starting empty"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn engine_with(limit: u64, caching: bool) -> StoreEngine {
        let config = Config {
            memory_limit: limit,
            caching,
            persistence: false,
            ..Default::default()
        };
        StoreEngine::new(Arc::new(Settings::from_config(&config)))
    }

    fn expected_mem(store: &Store) -> u64 {
        store
            .entries()
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }

    #[test]
    fn insert_then_get() {
        let engine = engine_with(0, true);
        let mut store = engine.write();
        store.insert("foo", "bar".to_string());
        assert_eq!(store.get("foo"), Some("bar"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn memory_estimate_tracks_mutations() {
        let engine = engine_with(0, true);
        let mut store = engine.write();

        store.insert("a", "12345".to_string());
        assert_eq!(store.mem_used(), 6);

        // overwrite applies the delta, not the full size again
        store.insert("a", "1".to_string());
        assert_eq!(store.mem_used(), 2);

        store.insert("bb", "xyz".to_string());
        assert_eq!(store.mem_used(), 7);

        assert!(store.remove("a"));
        assert_eq!(store.mem_used(), 5);
        assert!(!store.remove("a"));
        assert_eq!(store.mem_used(), 5);
    }

    #[test]
    fn memory_estimate_matches_sum_under_random_ops() {
        use rand::prelude::*;

        let engine = engine_with(0, true);
        let mut store = engine.write();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..3000 {
            let key = format!("key{}", rng.gen_range(0..64));
            match rng.gen_range(0..3) {
                0 | 1 => {
                    let len = rng.gen_range(0..48);
                    let value: String = std::iter::repeat('v').take(len).collect();
                    store.insert(&key, value);
                }
                _ => {
                    store.remove(&key);
                }
            }
            assert_eq!(store.mem_used(), expected_mem(&store));
        }
    }

    #[test]
    fn eviction_keeps_estimate_within_limit() {
        // keys and values are 4+6 = 10 bytes each; the limit fits three
        let engine = engine_with(30, true);
        let mut store = engine.write();

        for i in 0..5 {
            store.insert(&format!("key{}", i), "abcdef".to_string());
            let evicted = store.enforce_memory_limit();
            for key in &evicted {
                assert!(!store.contains(key));
                assert!(store.deadline(key).is_none());
            }
            assert!(store.mem_used() <= 30 || store.lru_len() == 0);
        }

        assert_eq!(store.len(), 3);
        // the two oldest were the victims
        assert!(!store.contains("key0"));
        assert!(!store.contains("key1"));
        assert!(store.contains("key4"));
        assert_eq!(store.mem_used(), expected_mem(&store));
    }

    #[test]
    fn touch_protects_from_eviction() {
        let engine = engine_with(30, true);
        let mut store = engine.write();

        store.insert("key0", "abcdef".to_string());
        store.insert("key1", "abcdef".to_string());
        store.insert("key2", "abcdef".to_string());
        // key0 becomes most-recently-used
        store.touch("key0");

        store.insert("key3", "abcdef".to_string());
        store.enforce_memory_limit();

        assert!(store.contains("key0"));
        assert!(!store.contains("key1"));
    }

    #[test]
    fn caching_disabled_never_evicts() {
        let engine = engine_with(10, false);
        let mut store = engine.write();
        store.insert("key", "a-value-larger-than-the-limit".to_string());
        assert!(store.enforce_memory_limit().is_empty());
        assert!(store.contains("key"));
        assert_eq!(store.lru_len(), 0);
    }

    #[test]
    fn sweep_removes_only_stale_deadlines() {
        let engine = engine_with(0, true);
        let mut store = engine.write();
        let now = now_ms();

        store.insert("stale", "v".to_string());
        store.set_deadline("stale", now - 10);
        store.insert("fresh", "v".to_string());
        store.set_deadline("fresh", now + 60_000);
        store.insert("forever", "v".to_string());

        let swept = store.sweep_expired(now);
        assert_eq!(swept, vec!["stale".to_string()]);
        assert!(!store.contains("stale"));
        assert!(store.contains("fresh"));
        assert!(store.contains("forever"));
        assert_eq!(store.dirty(), 1);
        assert_eq!(store.ttl_len(), 1);
    }

    #[test]
    fn remove_clears_deadline_too() {
        let engine = engine_with(0, true);
        let mut store = engine.write();
        store.insert("k", "v".to_string());
        store.set_deadline("k", now_ms() + 1000);
        assert!(store.remove("k"));
        assert_eq!(store.ttl_len(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let engine = engine_with(100, true);
        let mut store = engine.write();
        store.insert("a", "1".to_string());
        store.insert("b", "2".to_string());
        store.set_deadline("a", now_ms() + 1000);

        assert_eq!(store.clear(), 2);
        assert_eq!(store.len(), 0);
        assert_eq!(store.ttl_len(), 0);
        assert_eq!(store.mem_used(), 0);
        assert_eq!(store.lru_len(), 0);
    }

    #[test]
    fn count_prefix_counts_exact_prefixes() {
        let engine = engine_with(0, true);
        let mut store = engine.write();
        store.insert("user:1", "a".to_string());
        store.insert("user:2", "b".to_string());
        store.insert("session:1", "c".to_string());

        assert_eq!(store.count_prefix("user:"), 2);
        assert_eq!(store.count_prefix("session:"), 1);
        assert_eq!(store.count_prefix("nope"), 0);
    }

    #[test]
    fn commit_with_batch_zero_flushes_inline() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("nukekv.db"),
            batch_size: 0,
            ..Default::default()
        };
        let settings = Arc::new(Settings::from_config(&config));
        let engine = StoreEngine::new(Arc::clone(&settings));

        {
            let mut store = engine.write();
            store.insert("k", "v".to_string());
            engine.commit(&mut store, 1);
            assert_eq!(store.dirty(), 0, "primary flush resets the counter");
        }
        assert!(config.db_path.exists());
    }

    #[test]
    fn snapshot_round_trip_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("nukekv.db"),
            ..Default::default()
        };
        let settings = Arc::new(Settings::from_config(&config));
        let engine = StoreEngine::new(Arc::clone(&settings));
        let deadline = now_ms() + 60_000;

        {
            let mut store = engine.write();
            store.insert("plain", "value".to_string());
            store.insert("timed", "other".to_string());
            store.set_deadline("timed", deadline);
            engine.flush(&mut store, &config.db_path);
        }

        let restored = StoreEngine::new(Arc::new(Settings::from_config(&config)));
        restored.load_from_disk();
        let store = restored.read();
        assert_eq!(store.get("plain"), Some("value"));
        assert_eq!(store.get("timed"), Some("other"));
        assert_eq!(store.deadline("timed"), Some(deadline));
        assert_eq!(store.deadline("plain"), None);
        assert_eq!(store.mem_used(), 10 + 10);
        assert_eq!(store.lru_len(), 0, "no limit configured, no recency list");
    }

    #[test]
    fn load_enforces_memory_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("nukekv.db"),
            ..Default::default()
        };
        let writer = StoreEngine::new(Arc::new(Settings::from_config(&config)));
        {
            let mut store = writer.write();
            for i in 0..10 {
                store.insert(&format!("key{}", i), "abcdef".to_string());
            }
            writer.flush(&mut store, &config.db_path);
        }

        let capped = Config {
            memory_limit: 30,
            ..config
        };
        let reader = StoreEngine::new(Arc::new(Settings::from_config(&capped)));
        reader.load_from_disk();
        let store = reader.read();
        assert_eq!(store.len(), 3);
        assert!(store.mem_used() <= 30);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            db_path: dir.path().join("does-not-exist.db"),
            ..Default::default()
        };
        let engine = StoreEngine::new(Arc::new(Settings::from_config(&config)));
        engine.load_from_disk();
        assert!(engine.read().is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nukekv.db");
        std::fs::write(&path, "{ not json").unwrap();

        let config = Config {
            db_path: path,
            ..Default::default()
        };
        let engine = StoreEngine::new(Arc::new(Settings::from_config(&config)));
        engine.load_from_disk();
        assert!(engine.read().is_empty());
    }
}
