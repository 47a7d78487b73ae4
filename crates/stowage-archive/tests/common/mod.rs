#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use stowage_fs::{Error, FileSystem, LocalFs, Node, Result, WriteMode};

/// Relative path -> `Some(content)` for files, `None` for directories.
pub type Snapshot = BTreeMap<String, Option<Vec<u8>>>;

/// Sample tree used by the round-trip suites:
///
/// ```text
/// root/
///   a.txt          "hello"
///   empty/
///   nested/deeper/data.bin
///   nested/notes.md
/// ```
pub fn sample_tree(base: &Path) -> PathBuf {
    let root = base.join("root");
    std::fs::create_dir_all(root.join("empty")).unwrap();
    std::fs::create_dir_all(root.join("nested/deeper")).unwrap();
    std::fs::write(root.join("a.txt"), "hello").unwrap();
    std::fs::write(root.join("nested/notes.md"), "# notes\n\nline two\n").unwrap();
    let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
    std::fs::write(root.join("nested/deeper/data.bin"), data).unwrap();
    root
}

/// Every node under `root`, keyed by its '/'-joined path relative to `root`.
pub fn snapshot(root: &Path) -> Snapshot {
    let mut out = Snapshot::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if path.is_dir() {
                out.insert(rel, None);
                stack.push(path);
            } else {
                out.insert(rel, Some(std::fs::read(&path).unwrap()));
            }
        }
    }
    out
}

/// [`LocalFs`] whose writers fail once `budget` bytes have been written.
#[derive(Clone, Copy, Debug)]
pub struct FaultyFs {
    pub budget: usize,
}

pub struct FaultyWriter {
    inner: File,
    remaining: usize,
}

impl Read for FaultyWriter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for FaultyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("injected write fault"));
        }
        let n = buf.len().min(self.remaining);
        let written = self.inner.write(&buf[..n])?;
        self.remaining -= written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for FaultyWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl FileSystem for FaultyFs {
    type Reader = File;
    type Writer = FaultyWriter;

    fn open_read(&self, path: &Path) -> Result<File> {
        LocalFs.open_read(path)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<FaultyWriter> {
        Ok(FaultyWriter {
            inner: LocalFs.open_write(path, mode)?,
            remaining: self.budget,
        })
    }

    fn stat(&self, path: &Path) -> Result<Option<Node>> {
        LocalFs.stat(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Node>> {
        LocalFs.list_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        LocalFs.create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        LocalFs.remove(path)
    }
}

/// [`FaultyFs`] whose `remove` always fails.
#[derive(Clone, Copy, Debug)]
pub struct UndeletableFs {
    pub budget: usize,
}

impl FileSystem for UndeletableFs {
    type Reader = File;
    type Writer = FaultyWriter;

    fn open_read(&self, path: &Path) -> Result<File> {
        LocalFs.open_read(path)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<FaultyWriter> {
        FaultyFs { budget: self.budget }.open_write(path, mode)
    }

    fn stat(&self, path: &Path) -> Result<Option<Node>> {
        LocalFs.stat(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Node>> {
        LocalFs.list_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        LocalFs.create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        Err(Error::remove(path, io::ErrorKind::PermissionDenied.into()))
    }
}

/// [`LocalFs`] that records every path opened for writing.
#[derive(Debug, Default)]
pub struct RecordingFs {
    pub writes: RefCell<Vec<PathBuf>>,
}

impl FileSystem for RecordingFs {
    type Reader = File;
    type Writer = File;

    fn open_read(&self, path: &Path) -> Result<File> {
        LocalFs.open_read(path)
    }

    fn open_write(&self, path: &Path, mode: WriteMode) -> Result<File> {
        self.writes.borrow_mut().push(path.to_path_buf());
        LocalFs.open_write(path, mode)
    }

    fn stat(&self, path: &Path) -> Result<Option<Node>> {
        LocalFs.stat(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<Node>> {
        LocalFs.list_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        LocalFs.create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        LocalFs.remove(path)
    }
}

/// Bytes that deflate poorly, so a small write budget is exhausted early.
pub fn noisy_bytes(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}
