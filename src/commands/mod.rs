//! Command Module
//!
//! The command processing layer: parsed argument lists come in, sigil-
//! prefixed replies go out.
//!
//! ```text
//! tokenized command line
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │   dispatch on verb, validate arity,
//! │   (handler.rs)  │   run against the store engine
//! └────────┬────────┘
//!          │ JSON.* verbs
//!          ▼
//! ┌─────────────────┐
//! │  json operators │   path resolution, WHERE filters,
//! │    (json.rs)    │   whole-word search, append
//! └─────────────────┘
//! ```
//!
//! Every handler returns a [`Reply`] carrying a status code (200/400/404/500)
//! for in-process callers and the reply text that goes on the wire.

pub mod handler;
pub mod json;

// Re-export the main types
pub use handler::{CommandHandler, Reply};
