//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub const PRODUCT_GUID: &str = "{11111111-1111-1111-1111-111111111111}";

/// Temporary workspace holding `bin/` (`a.exe`, `docs/manual.pdf`),
/// `LICENSE.rtf` and an empty `out/` path.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(bin.join("docs")).unwrap();
        fs::write(bin.join("a.exe"), b"MZ").unwrap();
        fs::write(bin.join("docs").join("manual.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("LICENSE.rtf"), b"{\\rtf1 License}").unwrap();
        Self { dir }
    }

    pub fn bin(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    pub fn license(&self) -> PathBuf {
        self.dir.path().join("LICENSE.rtf")
    }

    pub fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
