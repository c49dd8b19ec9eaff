//! Wire Protocol Module
//!
//! NukeKV speaks a deliberately small protocol: every request and every
//! reply is a single frame, an 8-byte big-endian payload length followed by
//! the payload bytes. Requests carry one UTF-8 command line; replies carry
//! sigil-prefixed text (`+` ok, `-` error, `:` integer, `(nil)`, or a raw
//! JSON dump).
//!
//! - [`frame`]: length-prefixed framing with a hardened payload cap
//! - [`parser`]: the context-sensitive command tokenizer

pub mod frame;
pub mod parser;

// Re-export the commonly used pieces
pub use frame::{read_frame, write_frame, FrameError, MAX_PAYLOAD_SIZE};
pub use parser::tokenize;
