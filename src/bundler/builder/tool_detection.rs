//! External tool detection.
//!
//! Tools are searched in a fixed priority order: an explicitly configured
//! directory (or its `bin` subdirectory), then `PATH`, then a caller-supplied
//! list of well-known installation folders. The first existing executable wins.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// Program-files roots of the current machine, 32-bit folder first.
///
/// Cached to avoid re-reading the environment for every lookup.
pub static PROGRAM_FILES_ROOTS: LazyLock<Vec<PathBuf>> = LazyLock::new(|| {
    let mut roots: Vec<PathBuf> = Vec::new();
    for var in ["ProgramFiles(x86)", "ProgramFiles"] {
        let Some(root) = std::env::var_os(var).map(PathBuf::from) else {
            continue;
        };
        if !roots.contains(&root) {
            log::debug!("Program files root: {}", root.display());
            roots.push(root);
        }
    }
    roots
});

/// Platform file name of an executable (`candle.exe` on Windows).
pub fn executable_name(tool: &str) -> String {
    format!("{tool}{}", std::env::consts::EXE_SUFFIX)
}

/// Finds `tool`, returning the full path of the executable.
pub fn locate_tool(tool: &str, configured: Option<&Path>, fallbacks: &[PathBuf]) -> Option<PathBuf> {
    let file_name = executable_name(tool);

    if let Some(dir) = configured {
        for candidate in [dir.join(&file_name), dir.join("bin").join(&file_name)] {
            if candidate.is_file() {
                log::debug!("Found {tool} in configured directory: {}", candidate.display());
                return Some(candidate);
            }
        }
        log::warn!(
            "{tool} not found in configured directory {}, searching PATH",
            dir.display()
        );
    }

    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {tool} on PATH: {}", path.display());
            return Some(path);
        }
        Err(e) => log::debug!("{tool} not found in PATH: {e}"),
    }

    let found = fallbacks
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file());
    if let Some(path) = &found {
        log::debug!("Found {tool} at {}", path.display());
    }
    found
}
