//! Builder for constructing [`InstallerConfig`].

use super::{InstallScope, InstallerConfig, OutputKind, Platform, ToolchainSettings};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempPath;

/// File name of the license template shipped next to the executable.
pub const LICENSE_TEMPLATE_NAME: &str = "LicenseTemplate.rtf";

/// License template compiled into the binary, used when no copy is on disk.
pub const LICENSE_TEMPLATE: &[u8] = include_bytes!("../../../assets/LicenseTemplate.rtf");

/// Builder for constructing [`InstallerConfig`].
///
/// Every setter is optional; [`InstallerConfig::validate`] reports what is
/// still missing after [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use msi_creator::bundler::{InstallerConfigBuilder, OutputKind};
///
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
/// assert!(config.validate().is_valid());
/// assert_eq!(config.output_file_name(), "Widget_1.2.3.wxs");
/// ```
#[derive(Default)]
pub struct InstallerConfigBuilder {
    company_name: String,
    product_name: String,
    product_version: String,
    product_guid: String,
    main_executable: String,
    license_file: Option<PathBuf>,
    src_bin_directory: Option<PathBuf>,
    src_zip: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    output_kind: OutputKind,
    platform: Platform,
    install_scope: InstallScope,
    is_service: bool,
    url_info_about: Option<String>,
    url_update_info: Option<String>,
    toolchain: ToolchainSettings,
}

impl InstallerConfigBuilder {
    /// Creates a new builder with default platform (x64), output kind (msi)
    /// and scope (per-user-or-machine).
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the company (manufacturer) name.
    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }

    /// Sets the product name.
    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// Sets the product version.
    pub fn product_version(mut self, version: impl Into<String>) -> Self {
        self.product_version = version.into();
        self
    }

    /// Sets the product (upgrade) GUID.
    pub fn product_guid(mut self, guid: impl Into<String>) -> Self {
        self.product_guid = guid.into();
        self
    }

    /// Sets the main executable, relative to the binaries root.
    pub fn main_executable(mut self, path: impl Into<String>) -> Self {
        self.main_executable = path.into();
        self
    }

    /// Sets the license file. When never set, [`build`](Self::build) falls
    /// back to the bundled license template.
    pub fn license_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.license_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory of pre-built binaries.
    pub fn src_bin_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.src_bin_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets a zip archive of pre-built binaries.
    pub fn src_zip<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.src_zip = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output kind.
    ///
    /// Default: [`OutputKind::Msi`]
    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    /// Sets the target platform.
    ///
    /// Default: [`Platform::X64`]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the installation scope.
    ///
    /// Default: [`InstallScope::PerUserOrMachine`]
    pub fn install_scope(mut self, scope: InstallScope) -> Self {
        self.install_scope = scope;
        self
    }

    /// Installs the main executable as a Windows service instead of
    /// creating shortcuts.
    pub fn is_service(mut self, is_service: bool) -> Self {
        self.is_service = is_service;
        self
    }

    /// Sets the ARP "about" URL.
    pub fn url_info_about(mut self, url: impl Into<String>) -> Self {
        self.url_info_about = Some(url.into());
        self
    }

    /// Sets the ARP "update info" URL.
    pub fn url_update_info(mut self, url: impl Into<String>) -> Self {
        self.url_update_info = Some(url.into());
        self
    }

    /// Sets explicit external compiler locations.
    pub fn toolchain(mut self, toolchain: ToolchainSettings) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Builds the configuration.
    ///
    /// Resolves the default license file when none was set. Blank optional
    /// strings are normalized to `None`.
    pub fn build(self) -> InstallerConfig {
        let (license_file, license_copy) = match self.license_file {
            Some(path) => (Some(path), None),
            None => match shipped_license_file() {
                Some(path) => (Some(path), None),
                None => match embedded_license_copy() {
                    Some(copy) => (Some(copy.to_path_buf()), Some(Arc::new(copy))),
                    None => (None, None),
                },
            },
        };

        InstallerConfig {
            company_name: self.company_name,
            product_name: self.product_name,
            product_version: self.product_version,
            product_guid: self.product_guid,
            main_executable: self.main_executable,
            license_file,
            license_copy,
            src_bin_directory: self.src_bin_directory,
            src_zip: self.src_zip,
            output_directory: self.output_directory,
            output_kind: self.output_kind,
            platform: self.platform,
            install_scope: self.install_scope,
            is_service: self.is_service,
            url_info_about: self.url_info_about.filter(|u| !u.trim().is_empty()),
            url_update_info: self.url_update_info.filter(|u| !u.trim().is_empty()),
            toolchain: self.toolchain,
        }
    }
}

/// Locates the license template shipped alongside the running executable.
fn shipped_license_file() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe_dir = exe.parent()?;

    let found = [
        exe_dir.join(LICENSE_TEMPLATE_NAME),
        exe_dir.join("assets").join(LICENSE_TEMPLATE_NAME),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file());

    if let Some(path) = &found {
        log::debug!("Using default license file: {}", path.display());
    }
    found
}

/// Writes the built-in template to a temporary file.
///
/// The file is deleted when the returned path is dropped.
fn embedded_license_copy() -> Option<TempPath> {
    let mut file = match tempfile::Builder::new()
        .prefix("msi-creator-license-")
        .suffix(".rtf")
        .tempfile()
    {
        Ok(file) => file,
        Err(e) => {
            log::warn!("Failed to create license template copy: {e}");
            return None;
        }
    };
    if let Err(e) = file.write_all(LICENSE_TEMPLATE) {
        log::warn!("Failed to write license template copy: {e}");
        return None;
    }

    let path = file.into_temp_path();
    log::debug!("Using built-in license template: {}", path.display());
    Some(path)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_license_is_kept() {
        let config = InstallerConfigBuilder::new().license_file("EULA.rtf").build();
        assert_eq!(config.license_file(), Some(Path::new("EULA.rtf")));
    }

    #[test]
    fn default_license_always_resolves_to_a_file() {
        let config = InstallerConfigBuilder::new().build();
        let license = config.license_file().unwrap().to_path_buf();

        assert!(license.is_file());
        assert!(std::fs::read(&license).unwrap().starts_with(b"{\\rtf1"));
        assert!(!config.validate().missing_fields().contains(&"LicenseFile".to_string()));
    }

    #[test]
    fn built_in_license_copy_lives_as_long_as_the_config() {
        let copy = embedded_license_copy().unwrap();
        let path = copy.to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), LICENSE_TEMPLATE);

        let config = InstallerConfigBuilder::new().license_file(&path).build();
        let config = InstallerConfig {
            license_copy: Some(Arc::new(copy)),
            ..config
        };
        let clone = config.clone();
        drop(config);
        assert!(path.is_file());

        drop(clone);
        assert!(!path.exists());
    }
}
