//! Windows installer generator library
//!
//! Turns a directory (or zip archive) of pre-built binaries into a Windows
//! installer:
//! - MSI packages, compiled by the WiX Toolset v3 (`candle` + `light`)
//! - WiX source files (`.wxs`) for inspection or later compilation
//! - EXE installers, compiled by NSIS (`makensis`)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod source;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
