use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("destination conflict at '{path}': {reason}")]
    DestinationConflict { path: PathBuf, reason: &'static str },

    #[error("zip-slip attack detected: entry '{entry}' escapes '{root}'")]
    ZipSlip { entry: String, root: PathBuf },

    #[error("archive is corrupted: {0}")]
    Corrupted(String),

    #[error("failed to clean up '{path}': {source}")]
    CleanupFailed {
        path: PathBuf,
        source: stowage_fs::Error,
    },

    #[error(transparent)]
    Fs(#[from] stowage_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("7z error: {0}")]
    SevenZ(#[from] sevenz_rust::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn conflict(path: impl Into<PathBuf>, reason: &'static str) -> Self {
        Self::DestinationConflict {
            path: path.into(),
            reason,
        }
    }

    /// True for failures of the underlying byte streams or container data,
    /// as opposed to rejected arguments and policy decisions.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Fs(_) | Self::Io(_) | Self::Zip(_) | Self::SevenZ(_) | Self::Corrupted(_)
        )
    }
}
