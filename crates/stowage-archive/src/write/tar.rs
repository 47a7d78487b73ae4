use std::io::{self, BufWriter, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tar::{Builder, EntryType, Header};

use crate::error::Result;
use crate::write::ContainerSink;

pub(crate) struct TarSink<W: Write> {
    builder: Builder<BufWriter<W>>,
    mtime: u64,
}

impl<W: Write> TarSink<W> {
    pub(crate) fn new(out: W) -> Self {
        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            builder: Builder::new(BufWriter::new(out)),
            mtime,
        }
    }

    fn header(&self, kind: EntryType, size: u64, mode: u32) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(size);
        header.set_mode(mode);
        header.set_mtime(self.mtime);
        header
    }

    /// Write the end-of-archive blocks and flush.
    pub(crate) fn finish(self) -> Result<W> {
        let buffered = self.builder.into_inner()?;
        let mut out = buffered.into_inner().map_err(io::IntoInnerError::into_error)?;
        out.flush()?;
        Ok(out)
    }
}

impl<W: Write> ContainerSink for TarSink<W> {
    fn add_directory(&mut self, name: &str) -> Result<()> {
        let mut header = self.header(EntryType::Directory, 0, 0o755);
        self.builder.append_data(&mut header, name, io::empty())?;
        Ok(())
    }

    fn add_file<R: Read>(&mut self, name: &str, reader: &mut R, size: u64) -> Result<u64> {
        let mut header = self.header(EntryType::Regular, size, 0o644);
        // the header fixes the length; a source that shrank or grew mid-copy is an error
        let mut counted = reader.take(size);
        self.builder.append_data(&mut header, name, &mut counted)?;
        if counted.limit() != 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("'{name}' ended before its recorded {size} bytes"),
            )
            .into());
        }
        let mut extra = [0u8; 1];
        if counted.into_inner().read(&mut extra)? != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{name}' holds more than its recorded {size} bytes"),
            )
            .into());
        }
        Ok(size)
    }
}
