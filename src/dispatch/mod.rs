//! Dispatch Module
//!
//! The bridge between sessions and handlers: a FIFO task queue, a fixed
//! pool of workers, and a single-use reply slot per request.
//!
//! ```text
//! session ──enqueue──▶ [ task queue ] ──pop──▶ worker ──▶ CommandHandler
//!    ▲                                            │
//!    └──────────────── reply slot ◀───────────────┘
//! ```

pub mod pool;

// Re-export the main types
pub use pool::{Task, WorkerPool};
