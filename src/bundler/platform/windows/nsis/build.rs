//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use super::{script::NsisScript, toolset, utils};
use crate::bundler::{
    builder::process::run_tool,
    error::{Error, Result},
    settings::ToolchainSettings,
    utils::fs::create_dir_all,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Writes the script next to the output and runs makensis on it.
///
/// The `.nsi` file stays in the output directory after the build.
///
/// # Returns
/// Path of the compiled installer `.exe`
pub async fn run_makensis(
    script: &NsisScript,
    output_dir: &Path,
    toolchain: &ToolchainSettings,
) -> Result<PathBuf> {
    create_dir_all(output_dir).await?;

    let nsi_path = output_dir.join(script.script_file_name());
    utils::write_utf8_bom(&nsi_path, &script.render()?).await?;
    log::info!("Wrote NSIS script: {}", nsi_path.display());

    let makensis = toolset::locate_makensis(toolchain.nsis_dir.as_deref())?;
    log::info!("Running makensis...");

    let mut command = Command::new(&makensis);
    command
        .args(["-V3", "-INPUTCHARSET", "UTF8", "-OUTPUTCHARSET", "UTF8"])
        .arg(&nsi_path)
        .current_dir(output_dir);
    run_tool("makensis", command).await?;

    let installer = script.out_file().to_path_buf();
    if !installer.is_file() {
        return Err(Error::CompilationFailed {
            tool: "makensis".into(),
            exit_code: Some(0),
            diagnostic: format!("expected installer not found: {}", installer.display()),
        });
    }

    Ok(installer)
}
