//! Windows installer generation.
//!
//! Data flow: [`InstallerConfig`] → [`DirectoryTree`] → [`PackageDescription`]
//! → external compiler → [`BundledArtifact`].

pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;
pub mod tree;
pub mod utils;

pub use builder::Bundler;
pub use error::{Error, Result};
pub use platform::{DescriptionBuilder, PackageDescription};
pub use settings::{
    InstallScope, InstallerConfig, InstallerConfigBuilder, LICENSE_TEMPLATE_NAME, OutputKind,
    Platform, ProductVersion, ToolchainSettings, ValidationReport,
};
pub use tree::{DirectoryTree, FileGroup};

use std::path::PathBuf;

/// Installer produced by a [`Bundler`] run.
#[derive(Clone, Debug)]
pub struct BundledArtifact {
    /// Output kind that was built
    pub kind: OutputKind,
    /// Absolute path of the artifact
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA-256 hex digest
    pub checksum: String,
}
