//! Connection Module
//!
//! Per-client session handling for the framed TCP protocol.
//!
//! ## Connection lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. handle_session spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │   read one frame             │
//!    │   tokenize the command line  │
//!    │   PING/QUIT? answer inline   │
//!    │   else dispatch to the pool  │
//!    │   write the reply frame      │
//!    │         [loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. disconnect / protocol error → session ends, nothing is replied
//! ```
//!
//! Requests within one session are serialized end to end; across sessions
//! the interleaving is whatever the worker pool produces.

pub mod handler;

// Re-export the session entry points
pub use handler::{bind_listener, handle_session};
