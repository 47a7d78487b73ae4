//! Container writers.
//!
//! Directory-capable kinds (ZIP, TAR, 7Z) implement [`ContainerSink`] and are
//! driven by [`write_tree`]. GZIP wraps a single file, and TAR+GZIP chains the
//! TAR sink into the GZIP writer through a staging file.

use std::io::{self, BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use stowage_fs::{FileSystem, Node, NodeKind, WriteMode};

use crate::cleanup::CleanupGuard;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::format::ContainerKind;
use crate::options::EngineConfig;
use crate::tree;

pub(crate) mod gzip;
mod sevenz;
mod tar;
mod zip;

pub(crate) use self::sevenz::SevenZSink;
pub(crate) use self::tar::TarSink;
pub(crate) use self::zip::ZipSink;

/// Entry-level operations shared by directory-capable containers.
///
/// Each call opens, fills and closes one entry; no entry stays open once a
/// call returns, even on error.
pub(crate) trait ContainerSink {
    fn add_directory(&mut self, name: &str) -> Result<()>;

    /// Stream `reader` into a new file entry and return the bytes stored.
    fn add_file<R: Read>(&mut self, name: &str, reader: &mut R, size: u64) -> Result<u64>;
}

/// Copy through a buffer of `buffer_size` bytes.
pub(crate) fn copy_buffered<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
}

/// Name a source contributes as the first entry segment.
pub(crate) fn root_name(src: &Path, config: &EngineConfig) -> Result<String> {
    let name = match src.file_name() {
        Some(name) => PathBuf::from(name),
        None => std::path::absolute(src)?
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::invalid(format!("cannot name source '{}'", src.display())))?,
    };
    config.charset.encode(&name)
}

struct Pending {
    path: PathBuf,
    name: String,
    kind: NodeKind,
    size: u64,
}

/// Serialize the tree at `src` into `sink`.
///
/// A directory source contributes its own name as the first path segment. A
/// file source becomes one entry named by its file name. Directories without
/// children are recorded as directory entries; other directories are implied
/// by the names of their files. Children are visited depth-first in name
/// order from an explicit stack, so tree depth never grows the call stack.
pub(crate) fn write_tree<F, S>(fs: &F, src: &Node, sink: &mut S, config: &EngineConfig) -> Result<Vec<Entry>>
where
    F: FileSystem,
    S: ContainerSink,
{
    let mut written = Vec::new();
    let mut stack = vec![Pending {
        path: src.path.clone(),
        name: root_name(&src.path, config)?,
        kind: src.kind,
        size: src.size,
    }];

    while let Some(pending) = stack.pop() {
        match pending.kind {
            NodeKind::File => {
                let reader = fs.open_read(&pending.path)?;
                let mut reader = BufReader::with_capacity(config.buffer_size, reader);
                let bytes = sink.add_file(&pending.name, &mut reader, pending.size)?;
                tracing::debug!(entry = %pending.name, bytes, "wrote file entry");
                written.push(Entry::file(pending.name, bytes));
            }
            NodeKind::Directory => {
                let children = tree::list(fs, &pending.path, config.charset)?;
                if children.is_empty() {
                    let entry = Entry::directory(pending.name);
                    sink.add_directory(&entry.name)?;
                    tracing::debug!(entry = %entry.name, "wrote directory entry");
                    written.push(entry);
                    continue;
                }
                for child in children.into_iter().rev() {
                    let path = PathBuf::from(&child.name);
                    let segment = path
                        .file_name()
                        .map(Path::new)
                        .ok_or_else(|| Error::invalid(format!("unnamed child '{}'", child.name)))?;
                    let segment = config.charset.encode(segment)?;
                    stack.push(Pending {
                        name: format!("{}/{segment}", pending.name),
                        kind: if child.is_dir() { NodeKind::Directory } else { NodeKind::File },
                        size: child.size.unwrap_or(0),
                        path,
                    });
                }
            }
        }
    }
    Ok(written)
}

/// Write a directory-capable container of `kind` from `src` into `out`.
pub(crate) fn write_container<F, W>(
    fs: &F,
    src: &Node,
    kind: ContainerKind,
    dest: &Path,
    out: W,
    append: bool,
    config: &EngineConfig,
) -> Result<Vec<Entry>>
where
    F: FileSystem,
    W: Read + Write + Seek,
{
    match kind {
        ContainerKind::Zip => {
            let mut sink = if append {
                ZipSink::append(out, config.compression_level)?
            } else {
                ZipSink::new(out, config.compression_level)
            };
            let entries = write_tree(fs, src, &mut sink, config)?;
            sink.finish()?;
            Ok(entries)
        }
        ContainerKind::Tar => {
            let mut sink = TarSink::new(out);
            let entries = write_tree(fs, src, &mut sink, config)?;
            sink.finish()?;
            Ok(entries)
        }
        ContainerKind::SevenZ => {
            let mut sink = SevenZSink::new(out, config.compression_level)?;
            let entries = write_tree(fs, src, &mut sink, config)?;
            sink.finish()?;
            Ok(entries)
        }
        ContainerKind::Gzip => {
            let name = root_name(&src.path, config)?;
            let reader = fs.open_read(&src.path)?;
            let mut reader = BufReader::with_capacity(config.buffer_size, reader);
            let bytes = gzip::compress_stream(&mut reader, out, &name, config)?;
            tracing::debug!(entry = %name, bytes, "wrote gzip member");
            Ok(vec![Entry::file(name, bytes)])
        }
        ContainerKind::TarGzip => tar_gzip(fs, src, dest, out, config),
    }
}

/// TAR into a scoped staging file next to `dest`, then GZIP that into
/// `out`. The staging file is created and read through `fs`, and removed on
/// every exit path.
fn tar_gzip<F, W>(fs: &F, src: &Node, dest: &Path, out: W, config: &EngineConfig) -> Result<Vec<Entry>>
where
    F: FileSystem,
    W: Write,
{
    let name = format!("{}.tar", root_name(&src.path, config)?);
    let staging_dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let (writer, staging) = tempfile::Builder::new()
        .prefix(".stowage-")
        .suffix(".tar")
        .make_in(staging_dir, |path| open_staging(fs, path))?
        .into_parts();
    let staging = staging.keep().map_err(|err| err.error)?;
    let guard = CleanupGuard::new(fs, &staging, false, true);
    tracing::debug!(path = %staging.display(), "staging tar for gzip");

    let mut sink = TarSink::new(writer);
    let entries = write_tree(fs, src, &mut sink, config)?;
    drop(sink.finish()?);

    let mut staged = BufReader::with_capacity(config.buffer_size, fs.open_read(&staging)?);
    gzip::compress_stream(&mut staged, out, &name, config)?;
    drop(staged);

    fs.remove(&staging)?;
    guard.disarm();
    tracing::debug!(path = %staging.display(), "removed staging tar");
    Ok(entries)
}

/// Exclusive create, with collisions reported as `AlreadyExists` so the
/// name generator retries.
fn open_staging<F: FileSystem>(fs: &F, path: &Path) -> io::Result<F::Writer> {
    fs.open_write(path, WriteMode::CreateNew).map_err(|err| match err {
        stowage_fs::Error::AlreadyExists(_) => io::Error::from(io::ErrorKind::AlreadyExists),
        other => io::Error::other(other),
    })
}
