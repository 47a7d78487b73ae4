use std::io::BufReader;
use std::path::Path;

use stowage_fs::{FileSystem, LocalFs, Node, NodeKind};

use crate::cleanup::{self, CleanupGuard};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::extract::{self, Materializer};
use crate::format::{self, ContainerKind};
use crate::list;
use crate::options::{EngineConfig, Modifier, WriteIntent};
use crate::policy;
use crate::report::Report;
use crate::write;

/// Compression engine bound to one filesystem and one configuration.
///
/// ```no_run
/// use stowage_archive::{Archiver, ContainerKind, Modifier};
///
/// let archiver = Archiver::default();
/// let report = archiver.compress("root", "out", ContainerKind::Zip, &[Modifier::Overwrite])?;
/// assert_eq!(report.path, std::path::Path::new("out.zip"));
/// # Ok::<(), stowage_archive::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Archiver<F: FileSystem = LocalFs> {
    fs: F,
    config: EngineConfig,
}

impl Archiver<LocalFs> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_fs(LocalFs, config)
    }
}

impl Default for Archiver<LocalFs> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn require_path<'p>(path: &'p Path, what: &str) -> Result<&'p Path> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(Error::invalid(format!("{what} path is blank")));
    }
    Ok(path)
}

fn map_conflict(err: stowage_fs::Error) -> Error {
    match err {
        stowage_fs::Error::AlreadyExists(path) => {
            Error::conflict(path, "destination exists and overwrite protection is on")
        }
        other => Error::Fs(other),
    }
}

/// Lexical check that `dest` would land inside the directory `src`.
fn inside(dest: &Path, src: &Path) -> Result<bool> {
    Ok(std::path::absolute(dest)?.starts_with(std::path::absolute(src)?))
}

impl<F: FileSystem> Archiver<F> {
    pub fn with_fs(fs: F, config: EngineConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Changes apply to every later call.
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    fn stat_source(&self, src: &Path) -> Result<Node> {
        self.fs
            .stat(src)?
            .ok_or_else(|| Error::SourceNotFound(src.to_path_buf()))
    }

    /// Serialize the file or directory at `src` into a `kind` container at
    /// `dest`.
    ///
    /// Arguments and policy are checked before any output is opened. If the
    /// write fails after the destination was created by this call, the
    /// partial output and any parent directories made for it are removed
    /// when `delete_on_failure` is set.
    pub fn compress(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        kind: ContainerKind,
        modifiers: &[Modifier],
    ) -> Result<Report> {
        let config = &self.config;
        config.validate()?;
        let src = require_path(src.as_ref(), "source")?;
        let dest = policy::finalize_destination(dest.as_ref(), kind, config)?;
        let intent = WriteIntent::from_modifiers(modifiers);

        if intent == WriteIntent::Append && !kind.supports_append() {
            return Err(Error::invalid(format!("{kind} containers cannot be appended to")));
        }
        let node = self.stat_source(src)?;
        if node.is_dir() {
            if !kind.is_directory_capable() {
                return Err(Error::invalid(format!(
                    "{kind} wraps a single file but '{}' is a directory",
                    src.display()
                )));
            }
            if inside(&dest, src)? {
                return Err(Error::invalid(format!(
                    "destination '{}' is inside the source directory",
                    dest.display()
                )));
            }
        }

        let existed = self.fs.exists(&dest);
        let mode = policy::resolve_write_mode(&dest, existed, intent, config)?;
        let created = cleanup::outermost_missing(&self.fs, &dest);
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }

        let out = self.fs.open_write(&dest, mode).map_err(map_conflict)?;
        let guard = CleanupGuard::new(
            &self.fs,
            created.as_deref().unwrap_or(&dest),
            created.is_none(),
            config.delete_on_failure,
        );
        let entries = write::write_container(
            &self.fs,
            &node,
            kind,
            &dest,
            out,
            intent == WriteIntent::Append,
            config,
        )?;
        guard.disarm();

        let report = Report::new(kind, dest, entries);
        tracing::info!(
            kind = %kind,
            src = %src.display(),
            dest = %report.path.display(),
            entries = report.entry_count,
            bytes = report.total_bytes,
            "compressed"
        );
        Ok(report)
    }

    /// Compress with [`EngineConfig::default_kind`].
    pub fn compress_default(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        modifiers: &[Modifier],
    ) -> Result<Report> {
        self.compress(src, dest, self.config.default_kind, modifiers)
    }

    /// Recreate the contents of the `kind` container at `src` under `dest`.
    ///
    /// `dest` is a directory root unless it already is a file, the container
    /// is GZIP, or it does not exist and its name has an extension; a file
    /// destination receives the one file entry of the container.
    pub fn decompress(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        kind: ContainerKind,
        modifiers: &[Modifier],
    ) -> Result<Report> {
        let config = &self.config;
        config.validate()?;
        let src = require_path(src.as_ref(), "source")?;
        let dest = require_path(dest.as_ref(), "destination")?;
        let mode = policy::resolve_extract_mode(WriteIntent::from_modifiers(modifiers), config)?;

        let node = self.stat_source(src)?;
        if node.kind == NodeKind::Directory {
            return Err(Error::invalid(format!("'{}' is a directory, not a container", src.display())));
        }
        let target = extract::resolve_target(&self.fs, dest, kind)?;

        let created = cleanup::outermost_missing(&self.fs, dest);
        let source = BufReader::with_capacity(config.buffer_size, self.fs.open_read(src)?);
        let mut materializer = Materializer::new(
            &self.fs,
            target.clone(),
            mode,
            config.buffer_size,
            config.delete_on_failure,
        )?;
        let guard = CleanupGuard::new(
            &self.fs,
            created.as_deref().unwrap_or(dest),
            created.is_none(),
            config.delete_on_failure,
        );
        extract::extract_container(source, kind, src, &mut materializer)?;
        guard.disarm();

        let report = Report::new(kind, target.path().to_path_buf(), materializer.into_entries());
        tracing::info!(
            kind = %kind,
            src = %src.display(),
            dest = %report.path.display(),
            entries = report.entry_count,
            bytes = report.total_bytes,
            "decompressed"
        );
        Ok(report)
    }

    /// Sniff the container kind from its bytes, falling back to the name.
    pub fn detect_kind(&self, archive: impl AsRef<Path>) -> Result<ContainerKind> {
        let archive = require_path(archive.as_ref(), "archive")?;
        self.stat_source(archive)?;
        let mut reader = self.fs.open_read(archive)?;
        let detected = format::detect_from_reader(&mut reader)?;
        detected
            .or_else(|| ContainerKind::from_path(archive))
            .ok_or_else(|| Error::invalid(format!("unrecognized container '{}'", archive.display())))
    }

    pub fn decompress_auto(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        modifiers: &[Modifier],
    ) -> Result<Report> {
        let kind = self.detect_kind(src.as_ref())?;
        tracing::debug!(src = %src.as_ref().display(), kind = %kind, "detected container kind");
        self.decompress(src, dest, kind, modifiers)
    }

    /// Entries of a container, read from its index or headers without
    /// extracting payload bytes.
    pub fn list_entries(&self, archive: impl AsRef<Path>, kind: ContainerKind) -> Result<Vec<Entry>> {
        let archive = require_path(archive.as_ref(), "archive")?;
        let node = self.stat_source(archive)?;
        if node.is_dir() {
            return Err(Error::invalid(format!("'{}' is a directory, not a container", archive.display())));
        }
        let reader = BufReader::with_capacity(self.config.buffer_size, self.fs.open_read(archive)?);
        list::list_container(reader, kind, archive)
    }

    pub fn zip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.compress(src, dest, ContainerKind::Zip, modifiers)
    }

    pub fn gzip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.compress(src, dest, ContainerKind::Gzip, modifiers)
    }

    pub fn tar(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.compress(src, dest, ContainerKind::Tar, modifiers)
    }

    pub fn tar_gzip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.compress(src, dest, ContainerKind::TarGzip, modifiers)
    }

    pub fn seven_z(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.compress(src, dest, ContainerKind::SevenZ, modifiers)
    }

    pub fn unzip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.decompress(src, dest, ContainerKind::Zip, modifiers)
    }

    pub fn ungzip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.decompress(src, dest, ContainerKind::Gzip, modifiers)
    }

    pub fn untar(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.decompress(src, dest, ContainerKind::Tar, modifiers)
    }

    pub fn untar_gzip(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.decompress(src, dest, ContainerKind::TarGzip, modifiers)
    }

    pub fn unseven_z(&self, src: impl AsRef<Path>, dest: impl AsRef<Path>, modifiers: &[Modifier]) -> Result<Report> {
        self.decompress(src, dest, ContainerKind::SevenZ, modifiers)
    }
}
