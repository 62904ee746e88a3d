//! Windows NSIS installer creation.
//!
//! Script form of the package description: an NSIS script generated from the
//! mirrored tree and compiled with makensis.
//!
//! # Module Organization
//!
//! - `template` - NSI script template constants
//! - `toolset` - makensis location
//! - `script` - statement model and script rendering
//! - `build` - makensis execution and compilation
//! - `utils` - string escaping and BOM-prefixed writes

mod build;
mod script;
mod template;
mod toolset;
mod utils;

pub use build::run_makensis;
pub use script::{NsisScript, NsisStatement, RegistryEntry, RegistryValue, UNINSTALL_KEY_PREFIX};
