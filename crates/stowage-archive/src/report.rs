use std::path::PathBuf;

use crate::entry::Entry;
use crate::format::ContainerKind;

/// Outcome of a successful compress or decompress call.
#[derive(Clone, Debug)]
pub struct Report {
    pub kind: ContainerKind,
    /// Final container path for compression (after auto-suffix), or the
    /// extraction target for decompression.
    pub path: PathBuf,
    pub entry_count: usize,
    /// Payload bytes of file entries, before compression.
    pub total_bytes: u64,
    pub entries: Vec<Entry>,
}

impl Report {
    pub(crate) fn new(kind: ContainerKind, path: PathBuf, entries: Vec<Entry>) -> Self {
        let total_bytes = entries.iter().filter_map(|e| e.size).sum();
        Self {
            kind,
            path,
            entry_count: entries.len(),
            total_bytes,
            entries,
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_dir())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_dir())
    }
}
