use std::io::{BufReader, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use stowage_fs::FileSystem;

use crate::error::Result;
use crate::extract::Materializer;

/// Decoder that reads every member of a gzip stream.
pub(super) fn decoder<R: Read>(source: R) -> MultiGzDecoder<BufReader<R>> {
    MultiGzDecoder::new(BufReader::new(source))
}

/// Name recorded for the decompressed stream: the header's file name when
/// present, otherwise the archive's own name without `.gz`.
pub(crate) fn member_name(header_name: Option<&[u8]>, archive_path: &Path) -> String {
    if let Some(name) = header_name.filter(|n| !n.is_empty()) {
        return String::from_utf8_lossy(name).into_owned();
    }
    archive_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(super) fn extract<F, R>(source: R, archive_path: &Path, materializer: &mut Materializer<'_, F>) -> Result<()>
where
    F: FileSystem,
    R: Read,
{
    let mut decoder = decoder(source);
    // the header is parsed when the decoder is built over buffered input
    let name = member_name(decoder.header().and_then(|h| h.filename()), archive_path);
    let bytes = materializer.file(&name, &mut decoder)?;
    tracing::debug!(archive = %archive_path.display(), bytes, "decompressed gzip stream");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_name_prefers_header() {
        assert_eq!(member_name(Some(&b"data.csv"[..]), Path::new("archive.gz")), "data.csv");
        assert_eq!(member_name(Some(&b""[..]), Path::new("dir/archive.gz")), "archive");
        assert_eq!(member_name(None, Path::new("report.txt.gz")), "report.txt");
    }
}
