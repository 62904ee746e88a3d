//! Windows installer options: install scope, output kind, toolchain locations.

use crate::bundler::error::{Error, Result};
use std::{fmt, path::PathBuf, str::FromStr};

/// Installation scope.
///
/// Determines whether the installer installs for the current user only,
/// all users (requires admin), or lets the installer choose at run time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InstallScope {
    /// Per-user installation (no admin rights required).
    ///
    /// Installs under `%LOCALAPPDATA%`.
    PerUser,

    /// Per-machine installation (requires admin rights).
    ///
    /// Installs under `%PROGRAMFILES%`.
    PerMachine,

    /// Installer decides at run time. Treated as per-machine for paths and
    /// elevation.
    #[default]
    PerUserOrMachine,
}

impl InstallScope {
    /// Name used on the command line and in WiX `InstallScope`.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallScope::PerUser => "perUser",
            InstallScope::PerMachine => "perMachine",
            InstallScope::PerUserOrMachine => "perUserOrMachine",
        }
    }
}

impl FromStr for InstallScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "peruser" => Ok(InstallScope::PerUser),
            "permachine" => Ok(InstallScope::PerMachine),
            "peruserormachine" => Ok(InstallScope::PerUserOrMachine),
            other => Err(Error::InvalidConfiguration(format!(
                "invalid install scope '{other}'. Use perUser, perMachine, or perUserOrMachine."
            ))),
        }
    }
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the run produces.
///
/// | Kind | Form | Artifact |
/// |------|------|----------|
/// | `msi` | declarative (WiX) | compiled `.msi` |
/// | `wxs` | declarative (WiX) | `.wxs` source |
/// | `exe` | script (NSIS) | compiled `.exe` |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputKind {
    /// Compiled Windows Installer package.
    #[default]
    Msi,
    /// WiX source description, not compiled.
    Wxs,
    /// NSIS installer executable.
    Exe,
}

impl OutputKind {
    /// File extension of the produced artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Msi => "msi",
            OutputKind::Wxs => "wxs",
            OutputKind::Exe => "exe",
        }
    }

    /// Whether this kind is described by the WiX object graph.
    pub fn is_declarative(&self) -> bool {
        matches!(self, OutputKind::Msi | OutputKind::Wxs)
    }
}

impl FromStr for OutputKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "msi" => Ok(OutputKind::Msi),
            "wxs" => Ok(OutputKind::Wxs),
            "exe" => Ok(OutputKind::Exe),
            other => Err(Error::InvalidConfiguration(format!(
                "invalid output type '{other}'. Use 'msi', 'wxs' or 'exe'."
            ))),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Explicit locations of the external compilers.
///
/// Passed to the compile step instead of being exported into the process
/// environment. Unset fields fall back to `PATH` and the well-known
/// installation folders.
#[derive(Clone, Debug, Default)]
pub struct ToolchainSettings {
    /// WiX installation root or its `bin` directory (containing `candle`
    /// and `light`).
    pub wix_dir: Option<PathBuf>,

    /// NSIS installation root or its `bin` directory (containing `makensis`).
    pub nsis_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_kind_is_case_insensitive() {
        assert_eq!("MSI".parse::<OutputKind>().unwrap(), OutputKind::Msi);
        assert_eq!("Wxs".parse::<OutputKind>().unwrap(), OutputKind::Wxs);
        assert_eq!("exe".parse::<OutputKind>().unwrap(), OutputKind::Exe);
    }

    #[test]
    fn unknown_output_kind_is_a_configuration_error() {
        let err = "bogus".parse::<OutputKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn scope_round_trips_through_cli_spelling() {
        for scope in [
            InstallScope::PerUser,
            InstallScope::PerMachine,
            InstallScope::PerUserOrMachine,
        ] {
            assert_eq!(scope.as_str().parse::<InstallScope>().unwrap(), scope);
        }
    }
}
