use std::io::{BufWriter, Read, Write};

use flate2::{Compression, GzBuilder};

use crate::error::Result;
use crate::options::EngineConfig;
use crate::write::copy_buffered;

/// Compress one byte stream as a single gzip member named `name`.
///
/// Written at the end of an existing gzip file this adds a member, which
/// multi-member decoders read as concatenated content.
pub(crate) fn compress_stream<R, W>(reader: &mut R, out: W, name: &str, config: &EngineConfig) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write,
{
    let mut encoder = GzBuilder::new()
        .filename(name.as_bytes())
        .write(BufWriter::new(out), Compression::new(config.compression_level));
    let bytes = copy_buffered(reader, &mut encoder, config.buffer_size)?;
    let mut buffered = encoder.finish()?;
    buffered.flush()?;
    Ok(bytes)
}
