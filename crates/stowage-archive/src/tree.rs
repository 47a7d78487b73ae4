//! One-level tree enumeration.

use std::path::Path;

use stowage_fs::FileSystem;

use crate::entry::{Entry, EntryKind};
use crate::error::Result;
use crate::options::Charset;

/// Immediate children of `path` as entries named by their filesystem path.
///
/// Never recurses; an empty directory yields an empty list. Directory names
/// are left exactly as the filesystem reports them.
pub fn list<F: FileSystem>(fs: &F, path: &Path, charset: Charset) -> Result<Vec<Entry>> {
    fs.list_dir(path)?
        .into_iter()
        .map(|node| {
            let name = charset.encode(&node.path)?;
            Ok(if node.is_dir() {
                Entry {
                    name,
                    kind: EntryKind::Directory,
                    size: None,
                }
            } else {
                Entry::file(name, node.size)
            })
        })
        .collect()
}
