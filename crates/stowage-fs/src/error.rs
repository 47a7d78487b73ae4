use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to remove '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn read(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Read {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Write {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn remove(path: &Path, source: io::Error) -> Self {
        Self::Remove {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_lifts_not_found() {
        let err = Error::read(Path::new("missing"), io::ErrorKind::NotFound.into());
        assert!(matches!(err, Error::NotFound(p) if p == Path::new("missing")));
    }

    #[test]
    fn write_lifts_already_exists() {
        let err = Error::write(Path::new("out.zip"), io::ErrorKind::AlreadyExists.into());
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn write_keeps_other_kinds() {
        let err = Error::write(Path::new("out.zip"), io::ErrorKind::PermissionDenied.into());
        assert!(matches!(err, Error::Write { .. }));
        assert!(err.to_string().contains("out.zip"));
    }
}
