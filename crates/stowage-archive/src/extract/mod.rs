//! Container readers.
//!
//! Every reader walks its container once in stored order and hands each entry
//! to a [`Materializer`], which owns path mapping, zip-slip checks, open
//! modes and per-file cleanup. Entries map independently onto
//! `root/<sanitized name>`; no reader restarts its walk.

use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use stowage_fs::{FileSystem, NodeKind, WriteMode};

use crate::cleanup::CleanupGuard;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::format::ContainerKind;
use crate::sanitize;
use crate::write::copy_buffered;

pub(crate) mod gzip;
mod sevenz;
mod tar;
mod zip;

/// Where extracted entries land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    /// Entries are recreated under this root.
    Directory(PathBuf),
    /// The single file entry is written to exactly this path.
    File(PathBuf),
}

impl Target {
    pub(crate) fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::File(path) => path,
        }
    }
}

/// Decide whether `dest` names a directory root or a single output file.
///
/// An existing path keeps its type. Otherwise GZIP always targets a file and
/// the other kinds target a file only when the name has an extension.
pub(crate) fn resolve_target<F: FileSystem>(fs: &F, dest: &Path, kind: ContainerKind) -> Result<Target> {
    let existing = fs.stat(dest)?.map(|node| node.kind);
    match (kind, existing) {
        (ContainerKind::Gzip, Some(NodeKind::Directory)) => Err(Error::invalid(format!(
            "gzip output '{}' is a directory, expected a file",
            dest.display()
        ))),
        (ContainerKind::Gzip, _) | (_, Some(NodeKind::File)) => Ok(Target::File(dest.to_path_buf())),
        (_, Some(NodeKind::Directory)) => Ok(Target::Directory(dest.to_path_buf())),
        (_, None) if dest.extension().is_some() => Ok(Target::File(dest.to_path_buf())),
        (_, None) => Ok(Target::Directory(dest.to_path_buf())),
    }
}

/// Turns container entries into files and directories through a
/// [`FileSystem`].
pub(crate) struct Materializer<'a, F: FileSystem> {
    fs: &'a F,
    target: Target,
    mode: WriteMode,
    buffer_size: usize,
    delete_on_failure: bool,
    entries: Vec<Entry>,
    files_written: usize,
}

impl<'a, F: FileSystem> Materializer<'a, F> {
    pub(crate) fn new(
        fs: &'a F,
        target: Target,
        mode: WriteMode,
        buffer_size: usize,
        delete_on_failure: bool,
    ) -> Result<Self> {
        match &target {
            Target::Directory(root) => fs.create_dir_all(root)?,
            Target::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs.create_dir_all(parent)?;
                }
            }
        }
        Ok(Self {
            fs,
            target,
            mode,
            buffer_size,
            delete_on_failure,
            entries: Vec::new(),
            files_written: 0,
        })
    }

    pub(crate) fn directory(&mut self, name: &str) -> Result<()> {
        let Target::Directory(root) = &self.target else {
            tracing::debug!(entry = name, "skipping directory entry for file target");
            return Ok(());
        };
        let path = sanitize::resolve(root, name)?;
        self.fs.create_dir_all(&path)?;
        tracing::debug!(entry = name, path = %path.display(), "created directory");
        self.entries.push(Entry::directory(name));
        Ok(())
    }

    pub(crate) fn file<R: Read + ?Sized>(&mut self, name: &str, reader: &mut R) -> Result<u64> {
        let path = match &self.target {
            Target::Directory(root) => {
                let path = sanitize::resolve(root, name)?;
                if path == *root {
                    return Err(Error::Corrupted(format!("file entry with empty name '{name}'")));
                }
                if let Some(parent) = path.parent() {
                    self.fs.create_dir_all(parent)?;
                }
                path
            }
            Target::File(path) if self.files_written > 0 => {
                return Err(Error::invalid(format!(
                    "'{}' is a single file but the container holds more than one file",
                    path.display()
                )));
            }
            Target::File(path) => path.clone(),
        };

        let existed = self.fs.exists(&path);
        let out = self.fs.open_write(&path, self.mode).map_err(|e| match e {
            stowage_fs::Error::AlreadyExists(path) => {
                Error::conflict(path, "target exists and overwrite protection is on")
            }
            other => Error::Fs(other),
        })?;
        let guard = CleanupGuard::new(self.fs, &path, existed, self.delete_on_failure);

        let mut out = BufWriter::with_capacity(self.buffer_size, out);
        let bytes = copy_buffered(reader, &mut out, self.buffer_size)?;
        out.flush()?;
        drop(out);
        guard.disarm();

        tracing::debug!(entry = name, path = %path.display(), bytes, "extracted file");
        self.files_written += 1;
        self.entries.push(Entry::file(name, bytes));
        Ok(bytes)
    }

    pub(crate) fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

/// Extract every entry of a `kind` container read from `source`.
pub(crate) fn extract_container<F, R>(
    source: R,
    kind: ContainerKind,
    archive_path: &Path,
    materializer: &mut Materializer<'_, F>,
) -> Result<()>
where
    F: FileSystem,
    R: Read + Seek,
{
    match kind {
        ContainerKind::Zip => zip::extract(source, materializer),
        ContainerKind::Tar => tar::extract(source, materializer),
        ContainerKind::TarGzip => tar::extract(gzip::decoder(source), materializer),
        ContainerKind::Gzip => gzip::extract(source, archive_path, materializer),
        ContainerKind::SevenZ => sevenz::extract(source, materializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_fs::LocalFs;
    use tempfile::tempdir;

    #[test]
    fn target_follows_existing_type() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        assert_eq!(
            resolve_target(&LocalFs, &file, ContainerKind::Zip).unwrap(),
            Target::File(file.clone())
        );
        assert_eq!(
            resolve_target(&LocalFs, dir.path(), ContainerKind::Tar).unwrap(),
            Target::Directory(dir.path().to_path_buf())
        );
        assert!(matches!(
            resolve_target(&LocalFs, dir.path(), ContainerKind::Gzip),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn target_for_new_paths() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let csv = dir.path().join("restored.csv");
        assert!(matches!(
            resolve_target(&LocalFs, &out, ContainerKind::SevenZ).unwrap(),
            Target::Directory(_)
        ));
        assert!(matches!(
            resolve_target(&LocalFs, &csv, ContainerKind::Zip).unwrap(),
            Target::File(_)
        ));
        assert!(matches!(
            resolve_target(&LocalFs, &out, ContainerKind::Gzip).unwrap(),
            Target::File(_)
        ));
    }

    #[test]
    fn materializer_maps_names_under_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("out");
        let target = Target::Directory(root.clone());
        let mut m = Materializer::new(&LocalFs, target, WriteMode::CreateNew, 4, true).unwrap();

        m.directory("root/empty/").unwrap();
        m.file("root/nested/a.txt", &mut &b"hello"[..]).unwrap();
        let entries = m.into_entries();

        assert!(root.join("root/empty").is_dir());
        assert_eq!(std::fs::read(root.join("root/nested/a.txt")).unwrap(), b"hello");
        assert_eq!(entries, [Entry::directory("root/empty"), Entry::file("root/nested/a.txt", 5)]);
    }

    #[test]
    fn materializer_refuses_existing_when_protected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"original").unwrap();
        let target = Target::Directory(dir.path().to_path_buf());
        let mut m = Materializer::new(&LocalFs, target, WriteMode::CreateNew, 64, true).unwrap();

        let err = m.file("a.txt", &mut &b"new"[..]).unwrap_err();
        assert!(matches!(err, Error::DestinationConflict { .. }));
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"original");
    }

    #[test]
    fn file_target_takes_one_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.txt");
        let target = Target::File(path.clone());
        let mut m = Materializer::new(&LocalFs, target, WriteMode::CreateNew, 64, true).unwrap();

        m.directory("ignored/").unwrap();
        m.file("ignored/one.txt", &mut &b"one"[..]).unwrap();
        let err = m.file("ignored/two.txt", &mut &b"two"[..]).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"one");
    }

    #[test]
    fn escaping_names_write_nothing() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("out");
        let target = Target::Directory(root.clone());
        let mut m = Materializer::new(&LocalFs, target, WriteMode::CreateNew, 64, true).unwrap();

        let err = m.file("../escaped.txt", &mut &b"x"[..]).unwrap_err();
        assert!(matches!(err, Error::ZipSlip { .. }));
        assert!(!dir.path().join("escaped.txt").exists());
    }
}
