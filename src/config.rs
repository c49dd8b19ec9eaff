//! Server Configuration
//!
//! Compile-time defaults plus the small set of knobs that can be flipped at
//! runtime (`DEBUG`, `BATCH`). The runtime knobs live in [`Settings`] as
//! atomics so any task can read them without taking a lock.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// The default port NukeKV listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// The default host NukeKV binds to (IPv4 any-address).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The primary database filename for snapshot persistence.
pub const DATABASE_FILENAME: &str = "nukekv.db";

/// Scratch filename used by the STRESS command. Flushes here never reset
/// the dirty counter.
pub const STRESS_DB_FILENAME: &str = "stress-test.db";

/// Number of dirty mutations that triggers a background snapshot.
/// 0 means every mutation is flushed inline.
pub const DEFAULT_BATCH_SIZE: u32 = 1;

/// Default worker count. 0 means auto: `max(1, available_parallelism - 1)`.
pub const DEFAULT_WORKER_COUNT: usize = 0;

/// Default memory ceiling in bytes. 0 means unlimited (and disables the LRU).
pub const DEFAULT_MEMORY_LIMIT: u64 = 0;

/// Static configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path of the primary snapshot file
    pub db_path: PathBuf,
    /// Worker count (0 = auto)
    pub workers: usize,
    /// Memory ceiling in bytes (0 = unlimited)
    pub memory_limit: u64,
    /// Whether snapshots are written at all
    pub persistence: bool,
    /// Whether the LRU recency list is maintained
    pub caching: bool,
    /// Initial debug mode
    pub debug: bool,
    /// Initial batch size
    pub batch_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DATABASE_FILENAME),
            workers: DEFAULT_WORKER_COUNT,
            memory_limit: DEFAULT_MEMORY_LIMIT,
            persistence: true,
            caching: true,
            debug: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Returns the bind address as a string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves the effective worker count: the configured value if positive,
    /// otherwise one less than the machine's parallelism, floored at 1.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        cores.saturating_sub(1).max(1)
    }
}

/// Settings shared by every task in the server.
///
/// `debug` and `batch_size` are the two runtime-mutable scalars (`DEBUG` and
/// `BATCH` commands); everything else is fixed after startup.
#[derive(Debug)]
pub struct Settings {
    debug: AtomicBool,
    batch_size: AtomicU32,
    /// Path of the primary snapshot file
    pub db_path: PathBuf,
    /// Whether snapshots are written at all
    pub persistence: bool,
    /// Whether the LRU recency list is maintained
    pub caching: bool,
    /// Memory ceiling in bytes (0 = unlimited)
    pub memory_limit: u64,
    /// Effective worker count, resolved at startup
    pub workers: usize,
}

impl Settings {
    /// Builds the shared settings from a resolved [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            debug: AtomicBool::new(config.debug),
            batch_size: AtomicU32::new(config.batch_size),
            db_path: config.db_path.clone(),
            persistence: config.persistence,
            caching: config.caching,
            memory_limit: config.memory_limit,
            workers: config.worker_count(),
        }
    }

    /// Returns whether debug mode is currently on.
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Flips debug mode.
    pub fn set_debug(&self, on: bool) {
        self.debug.store(on, Ordering::Relaxed);
    }

    /// Returns the current batch size. 0 means flush every mutation inline.
    pub fn batch_size(&self) -> u32 {
        self.batch_size.load(Ordering::Relaxed)
    }

    /// Updates the batch size.
    pub fn set_batch_size(&self, size: u32) {
        self.batch_size.store(size, Ordering::Relaxed);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_auto_is_at_least_one() {
        let config = Config {
            workers: 0,
            ..Default::default()
        };
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn worker_count_explicit_wins() {
        let config = Config {
            workers: 7,
            ..Default::default()
        };
        assert_eq!(config.worker_count(), 7);
    }

    #[test]
    fn settings_runtime_flags() {
        let settings = Settings::default();
        assert!(!settings.debug());
        settings.set_debug(true);
        assert!(settings.debug());

        assert_eq!(settings.batch_size(), DEFAULT_BATCH_SIZE);
        settings.set_batch_size(0);
        assert_eq!(settings.batch_size(), 0);
    }
}
