use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

use crate::{Error, FileSystem, Node, NodeKind, Result, WriteMode};

/// [`FileSystem`] over the local disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn node_from_metadata(path: &Path, metadata: &fs::Metadata) -> Node {
    let kind = if metadata.is_dir() {
        NodeKind::Directory
    } else {
        NodeKind::File
    };
    Node {
        path: path.to_path_buf(),
        kind,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
    }
}

impl FileSystem for LocalFs {
    type Reader = File;
    type Writer = File;

    fn open_read(&self, path: &Path) -> Result<File> {
        File::open(path).map_err(|e| Error::read(path, e))
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<File> {
        let mut options = File::options();
        match mode {
            WriteMode::CreateNew => options.write(true).create_new(true),
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.read(true).write(true),
        };
        let mut file = options.open(path).map_err(|e| Error::write(path, e))?;
        if mode == WriteMode::Append {
            file.seek(SeekFrom::End(0))
                .map_err(|e| Error::write(path, e))?;
        }
        Ok(file)
    }

    fn stat(&self, path: &Path) -> Result<Option<Node>> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(node_from_metadata(path, &metadata))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::read(path, e)),
        }
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| Error::read(path, e))? {
            let entry = entry.map_err(|e| Error::read(path, e))?;
            let child = entry.path();
            // follows symlinks, so a linked directory is listed as a directory
            let metadata = fs::metadata(&child).map_err(|e| Error::read(&child, e))?;
            nodes.push(node_from_metadata(&child, &metadata));
        }
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(nodes)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::write(path, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let metadata = fs::symlink_metadata(path).map_err(|e| Error::read(path, e))?;
        if metadata.is_dir() {
            fs::remove_dir_all(path).map_err(|e| Error::remove(path, e))
        } else {
            fs::remove_file(path).map_err(|e| Error::remove(path, e))
        }
    }
}
