//! File system utilities for installer generation.
//!
//! An idempotent directory helper and the Windows long-path prefix applied to
//! paths before they reach filesystem calls.

use crate::bundler::error::{ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Windows extended-length path prefix.
#[cfg_attr(not(windows), allow(dead_code))]
const LONG_PATH_PREFIX: &str = r"\\?\";

/// Returns `path` in a form that bypasses the `MAX_PATH` limit.
///
/// On Windows an absolute path gets the `\\?\` prefix (UNC paths become
/// `\\?\UNC\server\share`). Relative and already-prefixed paths, and every
/// path on other platforms, are returned unchanged. Only use the result for
/// filesystem calls; never store it in descriptions.
pub fn extend_long_path(path: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        let raw = path.as_os_str().to_string_lossy();
        if !path.is_absolute() || raw.starts_with(LONG_PATH_PREFIX) {
            return path.to_path_buf();
        }
        if let Some(unc) = raw.strip_prefix(r"\\") {
            return PathBuf::from(format!(r"{LONG_PATH_PREFIX}UNC\{unc}"));
        }
        PathBuf::from(format!("{LONG_PATH_PREFIX}{raw}"))
    }

    #[cfg(not(windows))]
    {
        path.to_path_buf()
    }
}

/// Creates all of the directories of the specified path.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(extend_long_path(path))
        .await
        .fs_context("creating directory", path)
}

/// Writes `content` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).await?;
    }
    fs::write(extend_long_path(path), content)
        .await
        .fs_context("writing file", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn long_path_is_identity_off_windows() {
        let p = Path::new("/opt/app/bin");
        assert_eq!(extend_long_path(p), p);
    }

    #[cfg(windows)]
    #[test]
    fn long_path_prefixes_absolute_paths() {
        assert_eq!(
            extend_long_path(Path::new(r"C:\build\bin")),
            PathBuf::from(r"\\?\C:\build\bin")
        );
        assert_eq!(
            extend_long_path(Path::new(r"\\server\share\bin")),
            PathBuf::from(r"\\?\UNC\server\share\bin")
        );
        assert_eq!(extend_long_path(Path::new(r"bin")), PathBuf::from("bin"));
    }

    #[tokio::test]
    async fn create_dir_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/nested");
        create_dir_all(&target).await.unwrap();
        create_dir_all(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/c.txt");
        write_file(&file, "hello").await.unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello");
    }
}
