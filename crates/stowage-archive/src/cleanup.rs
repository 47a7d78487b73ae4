use std::path::{Path, PathBuf};

use stowage_fs::FileSystem;

use crate::error::Error;

/// Removes output a failed call created.
///
/// Armed only when the destination did not exist before the call and
/// `delete_on_failure` is set. [`CleanupGuard::disarm`] keeps the output;
/// dropping an armed guard deletes it. A failed deletion is logged and never
/// replaces the error the caller is already propagating.
pub struct CleanupGuard<'a, F: FileSystem> {
    fs: &'a F,
    path: PathBuf,
    armed: bool,
}

impl<'a, F: FileSystem> CleanupGuard<'a, F> {
    pub fn new(fs: &'a F, path: &Path, existed_before: bool, delete_on_failure: bool) -> Self {
        Self {
            fs,
            path: path.to_path_buf(),
            armed: delete_on_failure && !existed_before,
        }
    }

    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl<F: FileSystem> Drop for CleanupGuard<'_, F> {
    fn drop(&mut self) {
        if !self.armed || !self.fs.exists(&self.path) {
            return;
        }
        match self.fs.remove(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial output"),
            Err(source) => {
                let err = Error::CleanupFailed {
                    path: self.path.clone(),
                    source,
                };
                tracing::warn!(error = %err, "cleanup of partial output failed");
            }
        }
    }
}

/// Outermost of `path` and its ancestors that does not exist yet; `None`
/// when `path` itself exists. Output a call creates at `path` is rooted
/// there, including parent directories made on the way.
pub(crate) fn outermost_missing<F: FileSystem>(fs: &F, path: &Path) -> Option<PathBuf> {
    let mut missing = None;
    for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
        if fs.exists(ancestor) {
            break;
        }
        missing = Some(ancestor.to_path_buf());
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_fs::LocalFs;
    use tempfile::tempdir;

    #[test]
    fn armed_guard_removes_new_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.zip");
        {
            let _guard = CleanupGuard::new(&LocalFs, &out, false, true);
            std::fs::write(&out, b"partial").unwrap();
        }
        assert!(!out.exists());
    }

    #[test]
    fn disarmed_guard_keeps_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.zip");
        let guard = CleanupGuard::new(&LocalFs, &out, false, true);
        std::fs::write(&out, b"done").unwrap();
        guard.disarm();
        assert!(out.exists());
    }

    #[test]
    fn preexisting_output_is_never_removed() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.zip");
        std::fs::write(&out, b"theirs").unwrap();
        {
            let _guard = CleanupGuard::new(&LocalFs, &out, true, true);
        }
        assert_eq!(std::fs::read(&out).unwrap(), b"theirs");
    }

    #[test]
    fn disabled_cleanup_keeps_partial_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.zip");
        {
            let _guard = CleanupGuard::new(&LocalFs, &out, false, false);
            std::fs::write(&out, b"partial").unwrap();
        }
        assert!(out.exists());
    }

    #[test]
    fn outermost_missing_walks_up_to_existing_parent() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a/b/c.txt");
        assert_eq!(outermost_missing(&LocalFs, &deep), Some(dir.path().join("a")));

        std::fs::create_dir(dir.path().join("a")).unwrap();
        assert_eq!(outermost_missing(&LocalFs, &deep), Some(dir.path().join("a/b")));
        assert_eq!(outermost_missing(&LocalFs, dir.path()), None);
    }

    /// Removal always fails.
    struct Sticky;

    impl FileSystem for Sticky {
        type Reader = std::fs::File;
        type Writer = std::fs::File;

        fn open_read(&self, path: &Path) -> stowage_fs::Result<Self::Reader> {
            LocalFs.open_read(path)
        }

        fn open_write(&self, path: &Path, mode: stowage_fs::WriteMode) -> stowage_fs::Result<Self::Writer> {
            LocalFs.open_write(path, mode)
        }

        fn stat(&self, path: &Path) -> stowage_fs::Result<Option<stowage_fs::Node>> {
            LocalFs.stat(path)
        }

        fn list_dir(&self, path: &Path) -> stowage_fs::Result<Vec<stowage_fs::Node>> {
            LocalFs.list_dir(path)
        }

        fn create_dir_all(&self, path: &Path) -> stowage_fs::Result<()> {
            LocalFs.create_dir_all(path)
        }

        fn remove(&self, path: &Path) -> stowage_fs::Result<()> {
            Err(stowage_fs::Error::remove(path, std::io::ErrorKind::PermissionDenied.into()))
        }
    }

    #[test]
    fn failed_removal_is_logged_not_raised() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.zip");
        {
            let _guard = CleanupGuard::new(&Sticky, &out, false, true);
            std::fs::write(&out, b"partial").unwrap();
        }
        assert_eq!(std::fs::read(&out).unwrap(), b"partial");
    }

    #[test]
    fn armed_guard_with_nothing_written_is_quiet() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("never-created");
        drop(CleanupGuard::new(&LocalFs, &out, false, true));
        assert!(!out.exists());
    }
}
