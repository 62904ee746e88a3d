//! WiX build execution.
//!
//! `wxs` output writes the serialized source to the output directory.
//! `msi` output compiles it with candle and links it with light; the
//! intermediate files live in a temporary directory.

use super::{model::WixProject, toolset, wxs::to_wxs};
use crate::bundler::{
    builder::process::run_tool,
    error::{Error, ErrorExt, Result},
    settings::{OutputKind, ToolchainSettings},
    utils::fs::{create_dir_all, write_file},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Produces the `.wxs` or `.msi` artifact in `output_dir`.
pub async fn build_wix(
    project: &WixProject,
    output_dir: &Path,
    toolchain: &ToolchainSettings,
) -> Result<PathBuf> {
    create_dir_all(output_dir).await?;
    let source = to_wxs(project)?;
    let output = output_dir.join(project.output_file_name());

    if project.output_kind == OutputKind::Wxs {
        write_file(&output, source).await?;
        log::info!("Wrote WiX source: {}", output.display());
        return Ok(output);
    }

    let wix = toolset::locate_wix(toolchain.wix_dir.as_deref())?;
    let work_dir = tempfile::tempdir().fs_context("creating WiX work directory", output_dir)?;
    let wxs_path = work_dir.path().join(format!("{}.wxs", project.base_name));
    let wixobj_path = work_dir.path().join(format!("{}.wixobj", project.base_name));
    write_file(&wxs_path, source).await?;

    log::info!("Running candle for {}", wxs_path.display());
    let mut candle = Command::new(&wix.candle);
    candle
        .args(["-nologo", "-arch", project.package.platform.as_str()])
        .args(["-ext", "WixUtilExtension"])
        .arg("-out")
        .arg(&wixobj_path)
        .arg(&wxs_path)
        .current_dir(work_dir.path());
    run_tool("candle", candle).await?;

    log::info!("Running light");
    let mut light = Command::new(&wix.light);
    light
        .arg("-nologo")
        .args(["-ext", "WixUIExtension", "-ext", "WixUtilExtension"])
        .arg("-out")
        .arg(&output)
        .arg(&wixobj_path)
        .current_dir(work_dir.path());
    run_tool("light", light).await?;

    if let Err(e) = work_dir.close() {
        log::warn!("Failed to remove WiX work directory: {e}");
    }

    if !output.is_file() {
        return Err(Error::CompilationFailed {
            tool: "light".into(),
            exit_code: Some(0),
            diagnostic: format!("expected package not found: {}", output.display()),
        });
    }

    Ok(output)
}
