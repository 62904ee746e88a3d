//! Installer configuration types.
//!
//! [`InstallerConfig`] is the single immutable input to tree mirroring,
//! description building and compilation. It is assembled with
//! [`InstallerConfigBuilder`] and checked with [`InstallerConfig::validate`].

mod arch;
mod builder;
mod core;
mod package;
mod windows;

pub use arch::Platform;
pub use builder::{InstallerConfigBuilder, LICENSE_TEMPLATE, LICENSE_TEMPLATE_NAME};
pub use core::{InstallerConfig, ValidationReport};
pub use package::{ProductVersion, parse_product_guid};
pub use windows::{InstallScope, OutputKind, ToolchainSettings};
