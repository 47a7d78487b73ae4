use std::io::{Read, Seek, Write};

use sevenz_rust::lzma::LZMA2Options;
use sevenz_rust::{SevenZArchiveEntry, SevenZWriter};

use crate::error::Result;
use crate::write::ContainerSink;

pub(crate) struct SevenZSink<W: Write + Seek> {
    writer: SevenZWriter<W>,
}

impl<W: Write + Seek> SevenZSink<W> {
    pub(crate) fn new(out: W, level: u32) -> Result<Self> {
        let mut writer = SevenZWriter::new(out)?;
        writer.set_content_methods(vec![LZMA2Options::with_preset(level).into()]);
        Ok(Self { writer })
    }

    /// Write the archive header; nothing is readable before this.
    pub(crate) fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

fn entry(name: &str, is_directory: bool) -> SevenZArchiveEntry {
    let mut entry = SevenZArchiveEntry::new();
    entry.name = name.trim_end_matches('/').to_owned();
    entry.is_directory = is_directory;
    entry.has_stream = !is_directory;
    entry
}

impl<W: Write + Seek> ContainerSink for SevenZSink<W> {
    fn add_directory(&mut self, name: &str) -> Result<()> {
        self.writer
            .push_archive_entry::<&[u8]>(entry(name, true), None)?;
        Ok(())
    }

    fn add_file<R: Read>(&mut self, name: &str, reader: &mut R, _size: u64) -> Result<u64> {
        let pushed = self
            .writer
            .push_archive_entry(entry(name, false), Some(reader))?;
        Ok(pushed.size)
    }
}
