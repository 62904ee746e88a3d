//! Binary source resolution
//!
//! The binaries to package come either from a directory (used in place) or
//! from a zip archive (extracted into a temporary directory that is removed
//! when the [`StagedSource`] is dropped).

use crate::bundler::{
    Result,
    error::{Context, Error, ErrorExt},
    settings::InstallerConfig,
    utils::fs::extend_long_path,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where the pre-built binaries come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BinarySource {
    /// Directory supplied by the user; never modified or deleted.
    Directory(PathBuf),
    /// Zip archive extracted before mirroring.
    Zip(PathBuf),
}

impl BinarySource {
    /// Picks the source configured on `config`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` unless exactly one of directory or archive is set.
    pub fn from_config(config: &InstallerConfig) -> Result<Self> {
        match (config.src_bin_directory(), config.src_zip()) {
            (Some(dir), None) => Ok(Self::Directory(dir.to_path_buf())),
            (None, Some(zip)) => Ok(Self::Zip(zip.to_path_buf())),
            (Some(_), Some(_)) => Err(Error::InvalidConfiguration(
                "set SrcBinDirectory or SrcZip, not both".into(),
            )),
            (None, None) => Err(Error::InvalidConfiguration(
                "SrcBinDirectory or SrcZip is required".into(),
            )),
        }
    }

    /// Makes the binaries available as a directory.
    pub async fn stage(&self) -> Result<StagedSource> {
        match self {
            Self::Directory(dir) => Ok(StagedSource {
                root: dir.clone(),
                temp: None,
            }),
            Self::Zip(archive) => {
                let temp = tempfile::Builder::new()
                    .prefix("msi-creator-")
                    .tempdir()
                    .fs_context("creating extraction directory", std::env::temp_dir())?;
                log::info!(
                    "Extracting {} to {}",
                    archive.display(),
                    temp.path().display()
                );

                let archive_path = archive.clone();
                let target = temp.path().to_path_buf();
                tokio::task::spawn_blocking(move || extract_zip(&archive_path, &target))
                    .await
                    .context("zip extraction task panicked")??;

                Ok(StagedSource {
                    root: temp.path().to_path_buf(),
                    temp: Some(temp),
                })
            }
        }
    }
}

/// Extracts every entry of `archive` below `target`.
///
/// Entries whose names would escape `target` are rejected by the zip crate.
fn extract_zip(archive: &Path, target: &Path) -> Result<()> {
    let file = std::fs::File::open(extend_long_path(archive))
        .fs_context("opening source archive", archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    log::debug!("Archive holds {} entries", zip.len());
    zip.extract(target)?;
    Ok(())
}

/// Staged binaries directory.
///
/// Holds the temporary extraction directory, if any. Dropping it removes that
/// directory; a user-supplied directory is left untouched.
#[derive(Debug)]
pub struct StagedSource {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl StagedSource {
    /// Directory to mirror.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the root is a temporary extraction directory.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

impl Drop for StagedSource {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            let path = temp.path().to_path_buf();
            match temp.close() {
                Ok(()) => log::debug!("Removed extraction directory {}", path.display()),
                Err(e) => log::warn!(
                    "Failed to remove extraction directory {}: {e}",
                    path.display()
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::InstallerConfigBuilder;
    use std::io::Write;

    fn write_zip(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("a.exe", options).unwrap();
        zip.write_all(b"x").unwrap();
        zip.add_directory("docs/", options).unwrap();
        zip.start_file("docs/manual.pdf", options).unwrap();
        zip.write_all(b"x").unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn source_comes_from_exactly_one_field() {
        let dir = InstallerConfigBuilder::new().src_bin_directory("bin").build();
        assert_eq!(
            BinarySource::from_config(&dir).unwrap(),
            BinarySource::Directory(PathBuf::from("bin"))
        );

        let both = InstallerConfigBuilder::new()
            .src_bin_directory("bin")
            .src_zip("bin.zip")
            .build();
        assert!(BinarySource::from_config(&both).is_err());
    }

    #[tokio::test]
    async fn directory_is_used_in_place_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let staged = BinarySource::Directory(dir.path().to_path_buf())
            .stage()
            .await
            .unwrap();
        assert_eq!(staged.root(), dir.path());
        assert!(!staged.is_temporary());

        drop(staged);
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn zip_is_extracted_and_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bin.zip");
        write_zip(&archive);

        let staged = BinarySource::Zip(archive).stage().await.unwrap();
        let root = staged.root().to_path_buf();
        assert!(staged.is_temporary());
        assert!(root.join("a.exe").is_file());
        assert!(root.join("docs/manual.pdf").is_file());

        drop(staged);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn corrupt_archive_is_a_zip_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = BinarySource::Zip(archive).stage().await.unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
    }
}
