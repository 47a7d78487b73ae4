//! Compression and decompression of file trees into ZIP, TAR, GZIP,
//! TAR+GZIP and 7Z containers.
//!
//! # Architecture
//!
//! - `archiver.rs` - Call surface and per-call flow
//! - `policy.rs` - Destination suffix and open-mode resolution
//! - `cleanup.rs` - Removal of partial output on failure
//! - `tree.rs` - One-level tree enumeration
//! - `write/` - Per-format writers, driven by an explicit work stack
//! - `extract/` - Per-format readers and entry materialization
//! - `list.rs` - Container inspection
//! - `sanitize.rs` - Entry name resolution (zip-slip prevention)
//!
//! All storage access goes through [`stowage_fs::FileSystem`].

pub use archiver::Archiver;
pub use entry::{Entry, EntryKind};
pub use error::{Error, Result};
pub use format::{ContainerKind, detect_from_reader};
pub use options::{Charset, EngineConfig, Modifier};
pub use report::Report;
pub use sanitize::resolve as resolve_entry_path;
pub use stowage_fs::{FileSystem, LocalFs};

mod archiver;
mod cleanup;
pub mod entry;
mod error;
mod extract;
mod format;
mod list;
pub mod options;
mod policy;
mod report;
mod sanitize;
pub mod tree;
mod write;
