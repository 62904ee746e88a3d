//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that runs one installer
//! build: stage the binaries, mirror them, describe the package and compile it.

use super::checksum::calculate_sha256;
use crate::{
    bundler::{
        BundledArtifact, Result,
        error::{Error, ErrorExt},
        platform::DescriptionBuilder,
        settings::InstallerConfig,
        tree::DirectoryTree,
    },
    source::BinarySource,
};
use path_absolutize::Absolutize;

/// Main bundler orchestrator.
///
/// Holds a validated configuration. Nothing is cached between runs; every
/// call to [`bundle`](Self::bundle) mirrors the source tree afresh.
///
/// # Examples
///
/// ```no_run
/// use msi_creator::bundler::{Bundler, InstallerConfigBuilder, OutputKind};
///
/// # async fn example() -> msi_creator::bundler::Result<()> {
/// let config = InstallerConfigBuilder::new()
///     .company_name("Acme")
///     .product_name("Widget")
///     .product_version("1.2.3")
///     .product_guid("{11111111-1111-1111-1111-111111111111}")
///     .main_executable("a.exe")
///     .license_file("LICENSE.rtf")
///     .src_bin_directory("./bin")
///     .output_directory("./out")
///     .output_kind(OutputKind::Wxs)
///     .build();
///
/// let artifact = Bundler::new(config)?.bundle().await?;
/// println!("{} ({} bytes, sha256 {})", artifact.path.display(), artifact.size, artifact.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    config: InstallerConfig,
}

impl Bundler {
    /// Creates a bundler for a configuration.
    ///
    /// # Errors
    ///
    /// `MissingFields` listing every missing or invalid field.
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let report = config.validate();
        if !report.is_valid() {
            return Err(Error::MissingFields(report.into_missing_fields()));
        }
        Ok(Self { config })
    }

    /// Returns a reference to the installer configuration.
    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Builds the installer artifact.
    ///
    /// A temporary directory extracted from `-SrcZip` is removed when this
    /// returns, whether the build succeeded or not.
    pub async fn bundle(&self) -> Result<BundledArtifact> {
        let staged = BinarySource::from_config(&self.config)?.stage().await?;
        log::info!(
            "Mirroring {} for {}",
            staged.root().display(),
            self.config.product_name()
        );
        let tree = DirectoryTree::mirror_blocking(staged.root()).await?;
        log::debug!(
            "Mirrored {} files in {} directories",
            tree.file_count(),
            tree.nodes().len()
        );

        let description = DescriptionBuilder::new(&self.config).build(&tree)?;

        let output_dir = self.config.output_directory();
        let output_dir = output_dir
            .absolutize()
            .fs_context("resolving output directory", output_dir)?;
        let path = description
            .compile(&output_dir, self.config.toolchain())
            .await?;
        drop(staged);

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        log::info!("Created {} ({size} bytes)", path.display());
        log::info!("SHA256: {checksum}");

        Ok(BundledArtifact {
            kind: self.config.output_kind(),
            path,
            size,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{InstallerConfigBuilder, OutputKind};

    #[test]
    fn new_rejects_incomplete_config() {
        let config = InstallerConfigBuilder::new()
            .company_name("Acme")
            .license_file("LICENSE.rtf")
            .build();
        match Bundler::new(config).unwrap_err() {
            Error::MissingFields(fields) => {
                assert!(fields.contains(&"Product".to_string()));
                assert!(fields.contains(&"SrcBinDirectory or SrcZip".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn wxs_build_reports_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("a.exe"), b"x").unwrap();
        std::fs::write(dir.path().join("LICENSE.rtf"), b"{\\rtf1}").unwrap();

        let config = InstallerConfigBuilder::new()
            .company_name("Acme")
            .product_name("Widget")
            .product_version("1.2.3")
            .product_guid("11111111-1111-1111-1111-111111111111")
            .main_executable("a.exe")
            .license_file(dir.path().join("LICENSE.rtf"))
            .src_bin_directory(&bin)
            .output_directory(dir.path().join("out"))
            .output_kind(OutputKind::Wxs)
            .build();

        let artifact = Bundler::new(config).unwrap().bundle().await.unwrap();
        assert_eq!(artifact.kind, OutputKind::Wxs);
        assert!(artifact.path.is_absolute());
        assert_eq!(artifact.path, dir.path().join("out").join("Widget_1.2.3.wxs"));
        assert_eq!(artifact.size, std::fs::metadata(&artifact.path).unwrap().len());
        assert_eq!(artifact.checksum.len(), 64);
    }
}
