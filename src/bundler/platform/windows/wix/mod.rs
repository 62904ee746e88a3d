//! Windows Installer (MSI) creation with the WiX Toolset v3.
//!
//! Declarative form of the package description: an object graph mirroring the
//! source tree, serialized to `.wxs` and optionally compiled with candle/light.

mod build;
mod model;
mod toolset;
mod wxs;

pub use build::build_wix;
pub use model::{
    ControlPanelInfo, FolderComponent, INSTALL_DIR_ID, MajorUpgradeStrategy, PackageInfo,
    ShortcutComponent, WixComponent, WixDirectory, WixFile, WixProject, WixUi,
};
pub use wxs::to_wxs;
