//! Package descriptions and their compilation.
//!
//! [`DescriptionBuilder`] turns a configuration and a mirrored tree into a
//! [`PackageDescription`]: the declarative WiX form for `msi`/`wxs` output or
//! the NSIS script form for `exe` output. Both forms share one
//! [`InstallPolicy`], so they agree on install path, elevation and
//! shortcut/service decisions.

pub mod windows;

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::{InstallerConfig, ProductVersion, ToolchainSettings, parse_product_guid},
    tree::DirectoryTree,
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use windows::{InstallPolicy, nsis::NsisScript, normalize_relative, wix::WixProject};

/// Parsed and resolved inputs shared by both description forms.
#[derive(Debug)]
pub struct DescriptionContext<'a> {
    /// Validated configuration
    pub config: &'a InstallerConfig,
    /// Mirrored source tree
    pub tree: &'a DirectoryTree,
    /// Install decisions
    pub policy: InstallPolicy,
    /// Parsed product version
    pub version: ProductVersion,
    /// Parsed product (upgrade) GUID
    pub product_guid: Uuid,
    /// Absolute license file path, known to exist
    pub license_file: PathBuf,
    /// Absolute output directory
    pub output_directory: PathBuf,
    /// Main executable relative to the install directory, `\` separated
    pub main_executable: String,
    /// Source path of the main executable
    pub main_source: PathBuf,
}

impl<'a> DescriptionContext<'a> {
    /// Parses and resolves everything the description forms need.
    ///
    /// Reads the disk once to check the license file exists.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the version or GUID does not parse, the
    /// license file is missing, or the main executable is not in the tree.
    pub fn new(config: &'a InstallerConfig, tree: &'a DirectoryTree) -> Result<Self> {
        let version = ProductVersion::parse(config.product_version())?;
        let product_guid = parse_product_guid(config.product_guid())?;

        let license = config.license_file().ok_or_else(|| {
            Error::InvalidConfiguration("no license file configured".into())
        })?;
        if !license.is_file() {
            return Err(Error::InvalidConfiguration(format!(
                "license file not found: {}",
                license.display()
            )));
        }
        let license_file = absolute(license)?;

        let (_, main_source) = tree.find_file(config.main_executable()).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "main executable '{}' not found in {}",
                config.main_executable(),
                tree.path().display()
            ))
        })?;
        let main_source = main_source.to_path_buf();

        Ok(Self {
            config,
            tree,
            policy: InstallPolicy::from_config(config),
            version,
            product_guid,
            license_file,
            output_directory: absolute(config.output_directory())?,
            main_executable: normalize_relative(config.main_executable()),
            main_source,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving absolute path", path)?
        .into_owned())
}

/// Installer description in one of the two supported forms.
#[derive(Clone, Debug)]
pub enum PackageDescription {
    /// WiX object graph (`msi`, `wxs`).
    Declarative(WixProject),
    /// NSIS script (`exe`).
    Script(NsisScript),
}

impl PackageDescription {
    /// Install decisions encoded by the description.
    pub fn policy(&self) -> &InstallPolicy {
        match self {
            PackageDescription::Declarative(project) => &project.policy,
            PackageDescription::Script(script) => script.policy(),
        }
    }

    /// File name of the artifact this description compiles to.
    pub fn output_file_name(&self) -> String {
        match self {
            PackageDescription::Declarative(project) => project.output_file_name(),
            PackageDescription::Script(script) => script
                .out_file()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Hands the description to its external compiler.
    ///
    /// # Returns
    ///
    /// Path of the produced artifact inside `output_dir`.
    pub async fn compile(&self, output_dir: &Path, toolchain: &ToolchainSettings) -> Result<PathBuf> {
        match self {
            PackageDescription::Declarative(project) => {
                windows::wix::build_wix(project, output_dir, toolchain).await
            }
            PackageDescription::Script(script) => {
                windows::nsis::run_makensis(script, output_dir, toolchain).await
            }
        }
    }
}

/// Builds a [`PackageDescription`] for one configuration.
///
/// Performs no writes; the only disk access is the license existence check.
pub struct DescriptionBuilder<'a> {
    config: &'a InstallerConfig,
}

impl<'a> DescriptionBuilder<'a> {
    /// Creates a builder for `config`.
    pub fn new(config: &'a InstallerConfig) -> Self {
        Self { config }
    }

    /// Builds the description form selected by the output kind.
    pub fn build(&self, tree: &DirectoryTree) -> Result<PackageDescription> {
        let ctx = DescriptionContext::new(self.config, tree)?;

        let description = if self.config.output_kind().is_declarative() {
            PackageDescription::Declarative(WixProject::from_context(&ctx))
        } else {
            PackageDescription::Script(NsisScript::from_context(&ctx)?)
        };

        log::debug!(
            "Built {} description for {}",
            self.config.output_kind(),
            description.output_file_name()
        );
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{InstallerConfigBuilder, OutputKind};
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.exe"), b"x").unwrap();
        fs::write(dir.path().join("LICENSE.rtf"), b"{\\rtf1}").unwrap();
        dir
    }

    fn config(dir: &Path) -> InstallerConfigBuilder {
        InstallerConfigBuilder::new()
            .company_name("Acme")
            .product_name("Widget")
            .product_version("1.2.3")
            .product_guid("{11111111-1111-1111-1111-111111111111}")
            .main_executable("a.exe")
            .license_file(dir.join("LICENSE.rtf"))
            .src_bin_directory(dir)
            .output_directory(dir.join("out"))
    }

    fn build(config: InstallerConfigBuilder, dir: &Path) -> Result<PackageDescription> {
        let config = config.build();
        let tree = DirectoryTree::mirror(dir).unwrap();
        DescriptionBuilder::new(&config).build(&tree)
    }

    #[test]
    fn output_kind_selects_the_form() {
        let dir = fixture();
        for (kind, declarative, name) in [
            (OutputKind::Msi, true, "Widget_1.2.3.msi"),
            (OutputKind::Wxs, true, "Widget_1.2.3.wxs"),
            (OutputKind::Exe, false, "Widget_1.2.3.exe"),
        ] {
            let description = build(config(dir.path()).output_kind(kind), dir.path()).unwrap();
            assert_eq!(
                matches!(description, PackageDescription::Declarative(_)),
                declarative
            );
            assert_eq!(description.output_file_name(), name);
        }
    }

    #[test]
    fn unparsable_version_is_invalid_configuration() {
        let dir = fixture();
        let err = build(config(dir.path()).product_version("1.x"), dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn missing_license_fails_fast() {
        let dir = fixture();
        let err = build(
            config(dir.path()).license_file(dir.path().join("missing.rtf")),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(ref m) if m.contains("missing.rtf")));
    }

    #[test]
    fn main_executable_must_be_in_the_tree() {
        let dir = fixture();
        let err = build(config(dir.path()).main_executable("b.exe"), dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(ref m) if m.contains("b.exe")));
    }
}
