//! Filesystem collaborator consumed by the stowage archive engine.
//!
//! The engine never touches storage directly. It asks a [`FileSystem`] for
//! byte streams keyed by path, for one-level directory listings and for
//! directory creation and removal. [`LocalFs`] backs all of that with
//! `std::fs`; remote backends materialize to and from it.

pub use error::{Error, Result};
pub use local::LocalFs;

mod error;
mod local;

use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// What a stat or a listing knows about one path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub path: PathBuf,
    pub kind: NodeKind,
    /// Byte length for files, zero for directories.
    pub size: u64,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File)
    }
}

/// How [`FileSystem::open_write`] treats an existing path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the file; fail with [`Error::AlreadyExists`] if it exists.
    CreateNew,
    /// Create the file or truncate an existing one.
    Truncate,
    /// Open an existing file for reading and writing, positioned at its end.
    /// Never creates.
    Append,
}

pub trait FileSystem {
    type Reader: Read + Seek;
    type Writer: Read + Write + Seek;

    fn open_read(&self, path: &Path) -> Result<Self::Reader>;

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<Self::Writer>;

    /// `Ok(None)` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> Result<Option<Node>>;

    /// Immediate children of `path`, sorted by path. Never recursive.
    fn list_dir(&self, path: &Path) -> Result<Vec<Node>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a file, or a directory together with its contents.
    fn remove(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool {
        matches!(self.stat(path), Ok(Some(_)))
    }
}
