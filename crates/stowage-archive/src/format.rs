use std::fmt;
use std::io::{self, Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Container kinds the engine can write and read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    Zip,
    Gzip,
    Tar,
    TarGzip,
    #[serde(rename = "7z")]
    SevenZ,
}

const SEVEN_Z_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

impl ContainerKind {
    pub const ALL: [ContainerKind; 5] = [
        Self::Zip,
        Self::Gzip,
        Self::Tar,
        Self::TarGzip,
        Self::SevenZ,
    ];

    /// Canonical file extension, including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::Gzip => ".gz",
            Self::Tar => ".tar",
            Self::TarGzip => ".tar.gz",
            Self::SevenZ => ".7z",
        }
    }

    /// Whether the container can hold a directory tree.
    pub fn is_directory_capable(self) -> bool {
        !matches!(self, Self::Gzip)
    }

    /// Whether new entries can be added to an existing container.
    pub fn supports_append(self) -> bool {
        matches!(self, Self::Zip | Self::Gzip)
    }

    /// Guess the kind from a file name. `.tgz` is accepted for TAR+GZIP.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Some(Self::TarGzip);
        }
        [Self::Zip, Self::Gzip, Self::Tar, Self::SevenZ]
            .into_iter()
            .find(|kind| name.ends_with(kind.suffix()))
    }

    /// Guess the kind from the leading bytes of a container.
    ///
    /// A gzip stream is reported as [`ContainerKind::Gzip`]; telling TAR+GZIP
    /// apart needs the decompressed payload, see [`detect_from_reader`].
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(Self::Zip),
            [0x1F, 0x8B, ..] => Some(Self::Gzip),
            _ if data.starts_with(&SEVEN_Z_MAGIC) => Some(Self::SevenZ),
            _ if is_tar_header(data) => Some(Self::Tar),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zip => "zip",
            Self::Gzip => "gzip",
            Self::Tar => "tar",
            Self::TarGzip => "tar.gz",
            Self::SevenZ => "7z",
        })
    }
}

// Both POSIX "ustar\0" and GNU "ustar " magics.
fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 512 && data[257..262] == *b"ustar"
}

/// Sniff the container kind, looking inside gzip streams for a tar header.
/// The reader is rewound before returning.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ContainerKind>> {
    let mut header = Vec::with_capacity(512);
    reader.by_ref().take(512).read_to_end(&mut header)?;
    reader.rewind()?;

    let kind = ContainerKind::detect(&header);
    if kind != Some(ContainerKind::Gzip) {
        return Ok(kind);
    }

    let mut inner = Vec::with_capacity(512);
    let decoded = flate2::read::GzDecoder::new(reader.by_ref())
        .take(512)
        .read_to_end(&mut inner);
    reader.rewind()?;
    // a truncated or odd payload still makes a valid gzip guess
    if decoded.is_ok() && is_tar_header(&inner) {
        return Ok(Some(ContainerKind::TarGzip));
    }
    Ok(kind)
}
