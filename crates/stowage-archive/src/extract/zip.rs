use std::io::{Read, Seek};

use stowage_fs::FileSystem;

use crate::error::Result;
use crate::extract::Materializer;

pub(super) fn extract<F, R>(source: R, materializer: &mut Materializer<'_, F>) -> Result<()>
where
    F: FileSystem,
    R: Read + Seek,
{
    let mut archive = zip::ZipArchive::new(source)?;
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        // raw name; the materializer does its own zip-slip checks
        let name = file.name().to_owned();
        if file.is_dir() {
            materializer.directory(&name)?;
        } else {
            materializer.file(&name, &mut file)?;
        }
    }
    Ok(())
}
