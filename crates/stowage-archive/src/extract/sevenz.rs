use std::io::{Read, Seek, SeekFrom};

use sevenz_rust::{Password, SevenZReader};
use stowage_fs::FileSystem;

use crate::error::{Error, Result};
use crate::extract::Materializer;

pub(super) fn extract<F, R>(mut source: R, materializer: &mut Materializer<'_, F>) -> Result<()>
where
    F: FileSystem,
    R: Read + Seek,
{
    let len = source.seek(SeekFrom::End(0))?;
    source.rewind()?;
    let mut archive = SevenZReader::new(source, len, Password::empty())?;

    // the callback can only return 7z errors; ours are parked here and
    // stop the walk
    let mut failure: Option<Error> = None;
    archive.for_each_entries(|entry, reader| {
        let outcome = if entry.is_directory() {
            materializer.directory(entry.name())
        } else {
            materializer.file(entry.name(), reader).map(|_| ())
        };
        match outcome {
            Ok(()) => Ok(true),
            Err(err) => {
                failure = Some(err);
                Ok(false)
            }
        }
    })?;

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
