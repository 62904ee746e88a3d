//! Installer configuration record and its validation.

use super::{InstallScope, OutputKind, Platform, ToolchainSettings, parse_product_guid};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempPath;

/// Everything needed to describe one installer.
///
/// Built once from parsed arguments through [`InstallerConfigBuilder`] and
/// read-only afterwards. Construction never fails; call [`validate`] to find
/// out which required fields are missing.
///
/// [`InstallerConfigBuilder`]: super::InstallerConfigBuilder
/// [`validate`]: InstallerConfig::validate
#[derive(Clone, Debug)]
pub struct InstallerConfig {
    pub(super) company_name: String,
    pub(super) product_name: String,
    pub(super) product_version: String,
    pub(super) product_guid: String,
    pub(super) main_executable: String,
    pub(super) license_file: Option<PathBuf>,
    /// Temporary copy of the built-in license template, removed with the last clone.
    pub(super) license_copy: Option<Arc<TempPath>>,
    pub(super) src_bin_directory: Option<PathBuf>,
    pub(super) src_zip: Option<PathBuf>,
    pub(super) output_directory: Option<PathBuf>,
    pub(super) output_kind: OutputKind,
    pub(super) platform: Platform,
    pub(super) install_scope: InstallScope,
    pub(super) is_service: bool,
    pub(super) url_info_about: Option<String>,
    pub(super) url_update_info: Option<String>,
    pub(super) toolchain: ToolchainSettings,
}

/// Outcome of [`InstallerConfig::validate`].
///
/// Lists every missing or invalid field by its command-line name, in a
/// stable order, so the caller can report all of them at once.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    missing: Vec<String>,
}

impl ValidationReport {
    /// `true` when nothing is missing.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing or invalid field names.
    pub fn missing_fields(&self) -> &[String] {
        &self.missing
    }

    /// Consumes the report, returning the field names.
    pub fn into_missing_fields(self) -> Vec<String> {
        self.missing
    }

    fn require(&mut self, present: bool, field: &str) {
        if !present {
            self.missing.push(field.to_string());
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn path_is_blank(path: Option<&Path>) -> bool {
    path.is_none_or(|p| is_blank(&p.to_string_lossy()))
}

fn url_is_valid(value: Option<&str>) -> bool {
    value.is_none_or(|u| url::Url::parse(u).is_ok())
}

impl InstallerConfig {
    /// Checks required fields without touching the filesystem.
    ///
    /// Required: company name, license file, product name, version, exactly one
    /// of source directory / source archive, output directory, main executable
    /// and a parseable product GUID. ARP URLs, when given, must be absolute URLs.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        report.require(!is_blank(&self.company_name), "CompanyName");
        report.require(!path_is_blank(self.license_file.as_deref()), "LicenseFile");
        report.require(!is_blank(&self.product_name), "Product");
        report.require(!is_blank(&self.product_version), "Version");

        let has_dir = !path_is_blank(self.src_bin_directory.as_deref());
        let has_zip = !path_is_blank(self.src_zip.as_deref());
        match (has_dir, has_zip) {
            (false, false) => report.require(false, "SrcBinDirectory or SrcZip"),
            (true, true) => report.require(false, "SrcBinDirectory or SrcZip (not both)"),
            _ => {}
        }

        report.require(
            !path_is_blank(self.output_directory.as_deref()),
            "OutputDirectory",
        );
        report.require(!is_blank(&self.main_executable), "MainExecutable");
        report.require(
            !is_blank(&self.product_guid) && parse_product_guid(&self.product_guid).is_ok(),
            "ProductGuid",
        );
        report.require(url_is_valid(self.url_info_about.as_deref()), "UrlInfoAbout");
        report.require(url_is_valid(self.url_update_info.as_deref()), "UrlUpdateInfo");

        report
    }

    /// Company (manufacturer / publisher) name.
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// Product name shown to users.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Raw product version string.
    pub fn product_version(&self) -> &str {
        &self.product_version
    }

    /// Raw product GUID string (plain or braced).
    pub fn product_guid(&self) -> &str {
        &self.product_guid
    }

    /// Main executable, relative to the binaries root.
    pub fn main_executable(&self) -> &str {
        &self.main_executable
    }

    /// License file (RTF), after default resolution.
    pub fn license_file(&self) -> Option<&Path> {
        self.license_file.as_deref()
    }

    /// Directory of pre-built binaries.
    pub fn src_bin_directory(&self) -> Option<&Path> {
        self.src_bin_directory.as_deref()
    }

    /// Zip archive of pre-built binaries.
    pub fn src_zip(&self) -> Option<&Path> {
        self.src_zip.as_deref()
    }

    /// Directory receiving the artifact.
    ///
    /// Empty path when unset; [`validate`](Self::validate) reports it.
    pub fn output_directory(&self) -> &Path {
        self.output_directory.as_deref().unwrap_or(Path::new(""))
    }

    /// Requested artifact kind.
    pub fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    /// Target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Installation scope.
    pub fn install_scope(&self) -> InstallScope {
        self.install_scope
    }

    /// Whether the main executable is installed as a Windows service.
    pub fn is_service(&self) -> bool {
        self.is_service
    }

    /// ARP "about" URL.
    pub fn url_info_about(&self) -> Option<&str> {
        self.url_info_about.as_deref()
    }

    /// ARP "update info" URL.
    pub fn url_update_info(&self) -> Option<&str> {
        self.url_update_info.as_deref()
    }

    /// External compiler locations.
    pub fn toolchain(&self) -> &ToolchainSettings {
        &self.toolchain
    }

    /// `"{company} - {product}"`, used for shortcut and service descriptions.
    pub fn description(&self) -> String {
        format!("{} - {}", self.company_name, self.product_name)
    }

    /// `{productName}_{productVersion}` without extension.
    pub fn output_base_name(&self) -> String {
        format!("{}_{}", self.product_name, self.product_version)
    }

    /// Artifact file name with the extension of the requested output kind.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.output_base_name(), self.output_kind.extension())
    }
}
