//! # NukeKV - An In-Memory Key-Value Database
//!
//! NukeKV is an in-memory key-value server with optional disk persistence,
//! TTL expiry, LRU-based memory capping, JSON document operators, and a
//! framed TCP request/response protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                             NukeKV                                │
//! │                                                                   │
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────┐                │
//! │  │ TCP Server │──▶│   Session   │──▶│  Worker    │                │
//! │  │ (listener) │   │ frame+parse │   │  Pool      │                │
//! │  └────────────┘   └─────────────┘   └─────┬──────┘                │
//! │                                           │                       │
//! │                                           ▼                       │
//! │  ┌──────────────┐   ┌──────────────────────────────────────────┐  │
//! │  │  Background  │   │              StoreEngine                 │  │
//! │  │   Manager    │──▶│  RwLock( map + ttl + LRU + accounting )  │  │
//! │  │ sweep+flush  │   └──────────────────┬───────────────────────┘  │
//! │  └──────────────┘                      │                          │
//! │                                        ▼                          │
//! │                            ┌──────────────────────┐               │
//! │                            │  snapshot (nukekv.db)│               │
//! │                            └──────────────────────┘               │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flow for one request: TCP bytes → frame → tokens → task queue →
//! worker → handler (store lock, JSON operators as needed) → reply text →
//! frame → TCP.
//!
//! ## Wire protocol
//!
//! Every request and reply is one frame: an 8-byte big-endian payload
//! length followed by the payload. Requests carry a single UTF-8 command
//! line; replies carry sigil-prefixed text (`+` ok, `-` error, `:` integer,
//! `(nil)`, or a raw JSON/STATS dump). Declared lengths over 1 GiB close
//! the connection silently.
//!
//! ## Supported commands
//!
//! ### Strings
//! - `SET key "value" [EX seconds]`, `GET key`, `UPDATE key "value"`
//! - `DEL key [key …]`, `INCR key [amount]`, `DECR key [amount]`
//!
//! ### Expiry
//! - `TTL key`, `EXPIRE key seconds`
//!
//! ### JSON documents
//! - `JSON.SET key '{"a":1}' [EX s]`, `JSON.GET key [path …]`
//! - `JSON.GET key WHERE field value`
//! - `JSON.UPDATE key WHERE field value SET f1 v1 [f2 v2 …]`
//! - `JSON.DEL key [WHERE field value]`, `JSON.APPEND key '<json>'`
//! - `JSON.SEARCH key term [MAX n]`
//!
//! ### Server
//! - `STATS`, `BATCH n`, `DEBUG true|false`, `STRESS n`, `CLRDB`,
//!   `SIMILAR prefix`, `PING`, `QUIT`
//!
//! ## Module overview
//!
//! - [`protocol`]: frame codec and command tokenizer
//! - [`storage`]: store engine, LRU list, snapshots, background manager
//! - [`commands`]: per-verb handlers and the JSON operators
//! - [`dispatch`]: the worker pool
//! - [`connection`]: per-client sessions and the listener socket
//! - [`config`]: defaults and shared runtime settings

pub mod commands;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod fmt;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, Reply};
pub use config::{Config, Settings};
pub use connection::{bind_listener, handle_session};
pub use dispatch::WorkerPool;
pub use protocol::MAX_PAYLOAD_SIZE;
pub use storage::{BackgroundConfig, BackgroundManager, StoreEngine};

/// The default port NukeKV listens on
pub const DEFAULT_PORT: u16 = config::DEFAULT_PORT;

/// Version of NukeKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
