use std::io::{Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::write::ContainerSink;

pub(crate) struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
}

fn file_options(level: u32) -> SimpleFileOptions {
    let options = SimpleFileOptions::default().unix_permissions(0o644);
    if level == 0 {
        options.compression_method(CompressionMethod::Stored)
    } else {
        options
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }
}

impl<W: Write + Seek> ZipSink<W> {
    pub(crate) fn new(out: W, level: u32) -> Self {
        Self {
            writer: ZipWriter::new(out),
            options: file_options(level),
        }
    }

    pub(crate) fn finish(self) -> Result<()> {
        let mut out = self.writer.finish()?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Read + Write + Seek> ZipSink<W> {
    /// Continue an existing archive; new entries go before a rewritten
    /// central directory.
    pub(crate) fn append(out: W, level: u32) -> Result<Self> {
        Ok(Self {
            writer: ZipWriter::new_append(out)?,
            options: file_options(level),
        })
    }
}

impl<W: Write + Seek> ContainerSink for ZipSink<W> {
    fn add_directory(&mut self, name: &str) -> Result<()> {
        let options = self.options.unix_permissions(0o755);
        self.writer.add_directory(name, options)?;
        Ok(())
    }

    fn add_file<R: Read>(&mut self, name: &str, reader: &mut R, size: u64) -> Result<u64> {
        let options = self.options.large_file(size >= u64::from(u32::MAX));
        self.writer.start_file(name, options)?;
        Ok(std::io::copy(reader, &mut self.writer)?)
    }
}
