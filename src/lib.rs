//! vistext: vis/unvis reversible byte-stream escaping in Rust.
//!
//! The crate provides:
//! - The codec core: flags, the per-character encoder, line folding and the
//!   unvis state machine (`codec`)
//! - Streaming drivers over `std::io::Write` (`stream`)
//! - In-memory helpers (`engine`) and file-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use vistext::codec::FlagSet;
//! use vistext::engine;
//!
//! let data = b"tab\there\x00bell\x07";
//! let flags = FlagSet::C_STYLE | FlagSet::WHITE;
//!
//! let encoded = engine::encode(data, flags).unwrap();
//! assert_eq!(encoded, b"tab\\there\\0bell\\a");
//! let decoded = engine::decode(&encoded, flags).unwrap();
//! assert_eq!(decoded, data);
//! ```

pub mod codec;
pub mod engine;
pub mod io;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;
