//! Destination naming and open-mode resolution.

use std::path::{Path, PathBuf};

use stowage_fs::WriteMode;

use crate::error::{Error, Result};
use crate::format::ContainerKind;
use crate::options::{EngineConfig, WriteIntent};

/// Reject blank destinations and, when `auto_suffix` is on, append the
/// canonical extension for `kind` unless the name already carries it.
pub fn finalize_destination(dest: &Path, kind: ContainerKind, config: &EngineConfig) -> Result<PathBuf> {
    let raw = dest.as_os_str().to_string_lossy();
    if raw.trim().is_empty() {
        return Err(Error::invalid("destination path is blank"));
    }
    if !config.auto_suffix || has_suffix(dest, kind) {
        return Ok(dest.to_path_buf());
    }
    let mut name = dest.as_os_str().to_os_string();
    name.push(kind.suffix());
    Ok(PathBuf::from(name))
}

fn has_suffix(path: &Path, kind: ContainerKind) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_ascii_lowercase();
    match kind {
        ContainerKind::TarGzip => name.ends_with(".tar.gz") || name.ends_with(".tgz"),
        other => name.ends_with(other.suffix()),
    }
}

/// Open mode for a container written to `dest`.
///
/// `Append` needs an existing destination. Without `Overwrite`, overwrite
/// protection refuses an existing destination outright and opens new ones
/// with `CreateNew`, so a file that appears in between is refused as well.
pub fn resolve_write_mode(
    dest: &Path,
    exists: bool,
    intent: WriteIntent,
    config: &EngineConfig,
) -> Result<WriteMode> {
    match intent {
        WriteIntent::Append if !exists => Err(Error::conflict(
            dest,
            "append requested but destination does not exist",
        )),
        WriteIntent::Append => Ok(WriteMode::Append),
        WriteIntent::Overwrite => Ok(WriteMode::Truncate),
        WriteIntent::Default if !config.overwrite_protect => Ok(WriteMode::Truncate),
        WriteIntent::Default if exists => Err(Error::conflict(
            dest,
            "destination exists and overwrite protection is on",
        )),
        WriteIntent::Default => Ok(WriteMode::CreateNew),
    }
}

/// Open mode for each file materialized during extraction.
pub fn resolve_extract_mode(intent: WriteIntent, config: &EngineConfig) -> Result<WriteMode> {
    match intent {
        WriteIntent::Append => Err(Error::invalid("append is not supported when decompressing")),
        WriteIntent::Overwrite => Ok(WriteMode::Truncate),
        WriteIntent::Default if config.overwrite_protect => Ok(WriteMode::CreateNew),
        WriteIntent::Default => Ok(WriteMode::Truncate),
    }
}
