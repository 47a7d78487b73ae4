//! Container inspection without writing entries out.

use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use sevenz_rust::{Password, SevenZReader};

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::extract::gzip::member_name;
use crate::format::ContainerKind;

pub(crate) fn list_container<R: Read + Seek>(source: R, kind: ContainerKind, archive_path: &Path) -> Result<Vec<Entry>> {
    match kind {
        ContainerKind::Zip => list_zip(source),
        ContainerKind::Tar => list_tar(source),
        ContainerKind::TarGzip => list_tar(flate2::read::MultiGzDecoder::new(BufReader::new(source))),
        ContainerKind::Gzip => list_gzip(source, archive_path),
        ContainerKind::SevenZ => list_sevenz(source),
    }
}

fn list_zip<R: Read + Seek>(source: R) -> Result<Vec<Entry>> {
    let mut archive = zip::ZipArchive::new(source)?;
    (0..archive.len())
        .map(|index| {
            // raw access reads the central record without decompressing
            let file = archive.by_index_raw(index)?;
            Ok(if file.is_dir() {
                Entry::directory(file.name())
            } else {
                Entry::file(file.name(), file.size())
            })
        })
        .collect()
}

fn list_tar<R: Read>(source: R) -> Result<Vec<Entry>> {
    let mut archive = tar::Archive::new(source);
    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            entries.push(Entry::directory(name));
        } else if kind.is_file() {
            entries.push(Entry::file(name, entry.size()));
        }
    }
    Ok(entries)
}

/// One entry: the first member's name and the decompressed length of every
/// member. The ISIZE trailer only covers the last member modulo 2^32, so the
/// payload is counted instead.
fn list_gzip<R: Read>(source: R, archive_path: &Path) -> Result<Vec<Entry>> {
    let mut decoder = flate2::bufread::MultiGzDecoder::new(BufReader::new(source));
    let name = match decoder.header() {
        Some(header) => member_name(header.filename(), archive_path),
        None => return Err(Error::Corrupted("missing gzip header".into())),
    };
    let size = io::copy(&mut decoder, &mut io::sink())?;
    Ok(vec![Entry::file(name, size)])
}

fn list_sevenz<R: Read + Seek>(mut source: R) -> Result<Vec<Entry>> {
    let len = source.seek(SeekFrom::End(0))?;
    source.rewind()?;
    let reader = SevenZReader::new(source, len, Password::empty())?;
    Ok(reader
        .archive()
        .files
        .iter()
        .map(|file| {
            if file.is_directory() {
                Entry::directory(file.name())
            } else {
                Entry::file(file.name(), file.size)
            }
        })
        .collect())
}
