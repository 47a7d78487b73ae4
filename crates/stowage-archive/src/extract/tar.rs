use std::io::Read;

use stowage_fs::FileSystem;

use crate::error::Result;
use crate::extract::Materializer;

/// Regular files and directories are recreated; links, devices and other
/// special entries are skipped with a warning.
pub(super) fn extract<F, R>(source: R, materializer: &mut Materializer<'_, F>) -> Result<()>
where
    F: FileSystem,
    R: Read,
{
    let mut archive = tar::Archive::new(source);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            materializer.directory(&name)?;
        } else if kind.is_file() {
            materializer.file(&name, &mut entry)?;
        } else {
            tracing::warn!(entry = %name, kind = ?kind, "skipping unsupported tar entry");
        }
    }
    Ok(())
}
