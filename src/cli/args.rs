//! Command line argument parsing and validation.
//!
//! Flags are written PowerShell style (`-CompanyName Acme`) and matched
//! case-insensitively. [`normalize_args`] rewrites every recognized spelling
//! to its clap long form before parsing.

use crate::{
    bundler::{
        InstallScope, InstallerConfig, InstallerConfigBuilder, OutputKind, Platform,
        ToolchainSettings,
    },
    error::CliError,
};
use clap::{CommandFactory, Parser, builder::BoolishValueParser};
use std::{collections::HashMap, ffi::OsString, path::PathBuf};

/// Windows installer generator for pre-built binaries
#[derive(Parser, Debug, Default)]
#[command(
    name = "msi_creator",
    disable_version_flag = true,
    about = "Creates Windows installers (MSI via WiX, EXE via NSIS) from a directory of pre-built binaries",
    long_about = "Creates Windows installers (MSI via WiX, EXE via NSIS) from a directory of pre-built binaries.

Flags are case-insensitive and may be written with one or two dashes.

Usage:
  msi_creator -CompanyName Acme -Product Widget -Version 1.2.3 -SrcBinDirectory ./bin \\
      -OutputDirectory ./out -MainExecutable Widget.exe \\
      -ProductGuid {11111111-1111-1111-1111-111111111111}
  msi_creator ... -OutputType exe -InstallScope perUser
  msi_creator ... -OutputType wxs -IsService true

On success the absolute path of the installer is printed to standard output."
)]
pub struct Args {
    /// Company (manufacturer / publisher) name
    #[arg(long = "CompanyName", value_name = "NAME")]
    pub company_name: Option<String>,

    /// Product name
    #[arg(long = "Product", value_name = "NAME")]
    pub product: Option<String>,

    /// Product version, two to four numeric parts
    #[arg(long = "Version", value_name = "VERSION")]
    pub product_version: Option<String>,

    /// Directory of pre-built binaries
    #[arg(long = "SrcBinDirectory", value_name = "DIR")]
    pub src_bin_directory: Option<PathBuf>,

    /// Zip archive of pre-built binaries (instead of -SrcBinDirectory)
    #[arg(long = "SrcZip", value_name = "ZIP")]
    pub src_zip: Option<PathBuf>,

    /// Directory receiving the installer
    #[arg(long = "OutputDirectory", value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Main executable, relative to the binaries directory
    #[arg(long = "MainExecutable", value_name = "PATH")]
    pub main_executable: Option<String>,

    /// Product upgrade GUID, stable across versions
    #[arg(long = "ProductGuid", value_name = "GUID")]
    pub product_guid: Option<String>,

    /// Target platform: x64, x86, arm64 [default: x64]
    #[arg(long = "Platform", value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// License file (RTF) [default: LicenseTemplate.rtf next to the executable]
    #[arg(long = "LicenseFile", value_name = "RTF")]
    pub license_file: Option<PathBuf>,

    /// Output type: msi, wxs, exe [default: msi]
    #[arg(long = "OutputType", value_name = "TYPE")]
    pub output_type: Option<String>,

    /// Add/Remove Programs "about" URL
    #[arg(long = "UrlInfoAbout", value_name = "URL")]
    pub url_info_about: Option<String>,

    /// Add/Remove Programs "update info" URL
    #[arg(long = "UrlUpdateInfo", value_name = "URL")]
    pub url_update_info: Option<String>,

    /// Install scope: perUser, perMachine, perUserOrMachine [default: perUserOrMachine]
    #[arg(long = "InstallScope", value_name = "SCOPE")]
    pub install_scope: Option<String>,

    /// Install the main executable as a Windows service [default: false]
    #[arg(long = "IsService", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub is_service: Option<bool>,

    /// WiX Toolset directory (root or bin)
    #[arg(long = "WixDirectory", value_name = "DIR", env = "WIX")]
    pub wix_directory: Option<PathBuf>,

    /// NSIS directory containing makensis
    #[arg(long = "NsisDirectory", value_name = "DIR", env = "NSISDIR")]
    pub nsis_directory: Option<PathBuf>,
}

impl Args {
    /// Converts the arguments into an installer configuration.
    ///
    /// Enumerated values are parsed here, so an unrecognized output type,
    /// platform or scope fails before any filesystem work.
    pub fn to_config(&self) -> crate::bundler::Result<InstallerConfig> {
        let mut builder = InstallerConfigBuilder::new()
            .company_name(self.company_name.clone().unwrap_or_default())
            .product_name(self.product.clone().unwrap_or_default())
            .product_version(self.product_version.clone().unwrap_or_default())
            .product_guid(self.product_guid.clone().unwrap_or_default())
            .main_executable(self.main_executable.clone().unwrap_or_default())
            .is_service(self.is_service.unwrap_or(false))
            .toolchain(ToolchainSettings {
                wix_dir: self.wix_directory.clone(),
                nsis_dir: self.nsis_directory.clone(),
            });

        if let Some(kind) = &self.output_type {
            builder = builder.output_kind(kind.parse::<OutputKind>()?);
        }
        if let Some(platform) = &self.platform {
            builder = builder.platform(platform.parse::<Platform>()?);
        }
        if let Some(scope) = &self.install_scope {
            builder = builder.install_scope(scope.parse::<InstallScope>()?);
        }
        if let Some(path) = &self.license_file {
            builder = builder.license_file(path);
        }
        if let Some(path) = &self.src_bin_directory {
            builder = builder.src_bin_directory(path);
        }
        if let Some(path) = &self.src_zip {
            builder = builder.src_zip(path);
        }
        if let Some(path) = &self.output_directory {
            builder = builder.output_directory(path);
        }
        if let Some(url) = &self.url_info_about {
            builder = builder.url_info_about(url);
        }
        if let Some(url) = &self.url_update_info {
            builder = builder.url_update_info(url);
        }

        Ok(builder.build())
    }
}

/// Lowercased flag name to clap long name.
fn flag_table() -> HashMap<String, String> {
    let mut table: HashMap<String, String> = Args::command()
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .map(|long| (long.to_ascii_lowercase(), long.to_string()))
        .collect();
    table.insert("help".into(), "help".into());
    table
}

/// Rewrites `-companyname`, `--COMPANYNAME=x`, ... to `--CompanyName`.
///
/// The token after a recognized flag is its value and is passed through
/// untouched, even when it starts with a dash.
///
/// # Errors
///
/// - `UnknownArgument` for a dashed token that is not a known flag
/// - `MissingArgument` for a flag at the end of the line without its value
/// - `InvalidArguments` for a flag that is not valid UTF-8
pub fn normalize_args<I, T>(argv: I) -> Result<Vec<OsString>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let table = flag_table();
    let mut argv = argv.into_iter().map(Into::into);
    let mut out: Vec<OsString> = argv.next().into_iter().collect();

    while let Some(token) = argv.next() {
        let Some(text) = token.to_str() else {
            if token.to_string_lossy().starts_with('-') {
                return Err(CliError::InvalidArguments {
                    reason: format!("argument is not valid UTF-8: {}", token.to_string_lossy()),
                });
            }
            out.push(token);
            continue;
        };

        if !text.starts_with('-') || text == "-h" {
            out.push(token);
            continue;
        }

        let bare = text.trim_start_matches('-');
        let (name, inline_value) = match bare.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (bare, None),
        };
        let canonical = table
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| CliError::UnknownArgument {
                argument: text.to_string(),
            })?;

        if canonical == "help" {
            out.push("--help".into());
            continue;
        }

        match inline_value {
            Some(value) => out.push(format!("--{canonical}={value}").into()),
            None => {
                out.push(format!("--{canonical}").into());
                let value = argv.next().ok_or_else(|| CliError::MissingArgument {
                    argument: format!("-{canonical}"),
                })?;
                out.push(value);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(args: &[&str]) -> Result<Vec<String>, CliError> {
        normalize_args(args.iter().copied()).map(|v| {
            v.into_iter()
                .map(|s| s.to_string_lossy().into_owned())
                .collect()
        })
    }

    #[test]
    fn flags_are_case_insensitive() {
        assert_eq!(
            normalize(&["msi_creator", "-companyname", "Acme", "--OUTPUTTYPE=wxs"]).unwrap(),
            ["msi_creator", "--CompanyName", "Acme", "--OutputType=wxs"]
        );
    }

    #[test]
    fn values_are_not_rewritten() {
        assert_eq!(
            normalize(&["msi_creator", "-Product", "-product"]).unwrap(),
            ["msi_creator", "--Product", "-product"]
        );
    }

    #[test]
    fn help_spellings() {
        assert_eq!(normalize(&["x", "-Help"]).unwrap(), ["x", "--help"]);
        assert_eq!(normalize(&["x", "--help"]).unwrap(), ["x", "--help"]);
        assert_eq!(normalize(&["x", "-h"]).unwrap(), ["x", "-h"]);
    }

    #[test]
    fn unknown_and_dangling_flags_are_rejected() {
        assert!(matches!(
            normalize(&["x", "-Bogus", "1"]),
            Err(CliError::UnknownArgument { .. })
        ));
        assert!(matches!(
            normalize(&["x", "-Product"]),
            Err(CliError::MissingArgument { .. })
        ));
    }

    #[test]
    fn parses_into_config() {
        let argv = normalize_args([
            "msi_creator",
            "-CompanyName",
            "Acme",
            "-Product",
            "Widget",
            "-Version",
            "1.2.3",
            "-OutputType",
            "EXE",
            "-Platform",
            "x86",
            "-InstallScope",
            "peruser",
            "-IsService",
            "true",
            "-SrcBinDirectory",
            "./bin",
        ])
        .unwrap();
        let args = Args::try_parse_from(argv).unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.company_name(), "Acme");
        assert_eq!(config.product_version(), "1.2.3");
        assert_eq!(config.output_kind(), OutputKind::Exe);
        assert_eq!(config.platform(), Platform::X86);
        assert_eq!(config.install_scope(), InstallScope::PerUser);
        assert!(config.is_service());
    }

    #[test]
    fn bogus_output_type_is_a_configuration_error() {
        let args = Args {
            output_type: Some("bogus".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.to_config(),
            Err(crate::bundler::Error::InvalidConfiguration(_))
        ));
    }
}
