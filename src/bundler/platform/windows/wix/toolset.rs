//! WiX toolset location.

use crate::bundler::{
    builder::tool_detection::{PROGRAM_FILES_ROOTS, executable_name, locate_tool},
    error::{Error, Result},
};
use std::path::{Path, PathBuf};

/// Known WiX v3 installation folders, newest first.
const WIX_INSTALL_FOLDERS: &[&str] = &[
    "WiX Toolset v3.14",
    "WiX Toolset v3.11",
    "WiX Toolset v3.10",
    "WiX Toolset v3.9",
    "WiX Toolset v3.8",
    "WiX Toolset v3.7",
    "WiX Toolset v3.6",
    "Windows Installer XML v3.6",
    "Windows Installer XML v3.5",
    "Windows Installer XML v3",
];

/// Paths of the WiX compiler and linker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WixToolset {
    /// `candle` executable
    pub candle: PathBuf,
    /// `light` executable
    pub light: PathBuf,
}

/// Locates `candle` and `light`; both must live in the same directory.
pub fn locate_wix(configured: Option<&Path>) -> Result<WixToolset> {
    let fallbacks: Vec<PathBuf> = PROGRAM_FILES_ROOTS
        .iter()
        .flat_map(|root| {
            WIX_INSTALL_FOLDERS
                .iter()
                .map(move |folder| root.join(folder).join("bin"))
        })
        .collect();

    let unavailable = |tool: &str| Error::ToolchainUnavailable {
        tool: tool.into(),
        guidance: "Install the WiX Toolset v3 (https://wixtoolset.org) and put its bin \
                   directory on PATH, or pass -WixDirectory / set WIX."
            .into(),
    };

    let candle = locate_tool("candle", configured, &fallbacks).ok_or_else(|| unavailable("candle"))?;
    let light = candle
        .parent()
        .map(|bin| bin.join(executable_name("light")))
        .filter(|light| light.is_file())
        .ok_or_else(|| unavailable("light"))?;

    Ok(WixToolset { candle, light })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_candle_and_light_under_configured_root() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(executable_name("candle")), b"").unwrap();
        std::fs::write(bin.join(executable_name("light")), b"").unwrap();

        let toolset = locate_wix(Some(dir.path())).unwrap();
        assert_eq!(toolset.candle, bin.join(executable_name("candle")));
        assert_eq!(toolset.light, bin.join(executable_name("light")));
    }

    #[test]
    fn candle_without_light_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(executable_name("candle")), b"").unwrap();

        let err = locate_wix(Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::ToolchainUnavailable { ref tool, .. } if tool == "light"));
    }
}
