use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Map an archive entry name onto a path under `root`.
///
/// Names are split on both '/' and '\\'. Empty and `.` segments are dropped.
/// Absolute names, drive prefixes and `..` segments are rejected as zip-slip
/// before anything touches the disk.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf> {
    let slip = || Error::ZipSlip {
        entry: name.to_owned(),
        root: root.to_path_buf(),
    };

    if name.contains('\0') {
        return Err(Error::invalid(format!("entry name contains a null byte: {name:?}")));
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(slip());
    }

    let mut resolved = root.to_path_buf();
    for segment in name.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if !segment.contains(':') => resolved.push(part),
            _ => return Err(slip()),
        }
    }
    Ok(resolved)
}
