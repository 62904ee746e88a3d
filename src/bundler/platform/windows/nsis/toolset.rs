//! NSIS toolset location.
//!
//! Finds `makensis` in the configured directory, then on `PATH`, then in the
//! default NSIS installation folders.

use crate::bundler::{
    builder::tool_detection::{PROGRAM_FILES_ROOTS, locate_tool},
    error::{Error, Result},
};
use std::path::{Path, PathBuf};

/// Default installation folders, relative to each program-files root.
const NSIS_INSTALL_FOLDERS: &[&str] = &["NSIS", r"NSIS\Bin"];

/// Locates the `makensis` executable.
pub fn locate_makensis(configured: Option<&Path>) -> Result<PathBuf> {
    let fallbacks: Vec<PathBuf> = PROGRAM_FILES_ROOTS
        .iter()
        .flat_map(|root| NSIS_INSTALL_FOLDERS.iter().map(move |f| root.join(f)))
        .collect();

    locate_tool("makensis", configured, &fallbacks).ok_or_else(|| Error::ToolchainUnavailable {
        tool: "makensis".into(),
        guidance: "Install NSIS (https://nsis.sourceforge.io) and put makensis on PATH, \
                   or pass -NsisDirectory / set NSISDIR."
            .into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(crate::bundler::builder::tool_detection::executable_name("makensis"));
        std::fs::write(&exe, b"").unwrap();

        assert_eq!(locate_makensis(Some(dir.path())).unwrap(), exe);
    }
}
