//! Storage Module
//!
//! The store engine and everything that keeps it healthy over time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      StoreEngine                        │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │ RwLock<Store>                                     │  │
//! │  │   key → value map        key → deadline map       │  │
//! │  │   LRU recency list       memory estimate + dirty  │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └───────────────┬───────────────────────────┬─────────────┘
//!                 │                           │
//!     ┌───────────┴───────────┐   ┌───────────┴───────────┐
//!     │   BackgroundManager   │   │       snapshot        │
//!     │ (sweep + batch flush) │   │ (load/save JSON file) │
//!     └───────────────────────┘   └───────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Single lock**: one reader/writer lock guards the whole aggregate
//! - **LRU capping**: tail eviction while the memory estimate exceeds the
//!   configured limit
//! - **Sweep-only expiry**: reads never check deadlines; the background
//!   manager removes stale keys about once a second
//! - **Snapshot persistence**: whole-state JSON dumps, batched by a dirty
//!   counter or flushed inline when the batch size is 0

pub mod background;
pub mod engine;
pub mod lru;
pub mod snapshot;

// Re-export the commonly used types
pub use background::{BackgroundConfig, BackgroundManager};
pub use engine::{now_ms, Store, StoreEngine};
pub use lru::LruList;
pub use snapshot::{Snapshot, SnapshotError};
