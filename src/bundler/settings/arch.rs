//! Target platform for the generated installer.

use crate::bundler::error::{Error, Result};
use std::{fmt, str::FromStr};

/// CPU architecture the installer targets.
///
/// Selects the WiX `-arch` switch and `Package/@Platform`, and whether the
/// 64-bit or 32-bit program-files folder is used for per-machine installs.
///
/// # Examples
///
/// ```
/// use msi_creator::bundler::Platform;
///
/// let platform: Platform = "ARM64".parse().unwrap();
/// assert_eq!(platform, Platform::Arm64);
/// assert_eq!(platform.as_str(), "arm64");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Platform {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    X64,
    /// x86 (32-bit)
    X86,
    /// ARM64 (64-bit)
    Arm64,
}

impl Platform {
    /// Identifier used by both WiX and NSIS.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X64 => "x64",
            Platform::X86 => "x86",
            Platform::Arm64 => "arm64",
        }
    }

    /// Whether the platform installs into the 64-bit program-files folder.
    pub fn is_64bit(&self) -> bool {
        !matches!(self, Platform::X86)
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x64" => Ok(Platform::X64),
            "x86" => Ok(Platform::X86),
            "arm64" => Ok(Platform::Arm64),
            other => Err(Error::InvalidConfiguration(format!(
                "invalid platform '{other}'. Use x64, x86, or arm64."
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
