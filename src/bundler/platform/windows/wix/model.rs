//! Declarative WiX object graph.
//!
//! Directories, components and files mirror the source tree. Identifiers and
//! component GUIDs are name-based UUIDs derived from the upgrade code and the
//! file's path relative to the source root, so rebuilding the same tree gives
//! the same identifiers.

use crate::bundler::{
    platform::{
        DescriptionContext,
        windows::{EntryPoints, InstallPolicy, ServiceRegistration, Shortcut},
    },
    settings::{InstallScope, OutputKind, Platform, ProductVersion},
    tree::DirectoryTree,
};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Id of the product install directory.
pub const INSTALL_DIR_ID: &str = "INSTALLDIR";
/// Id of the company folder holding the install directory.
pub const COMPANY_DIR_ID: &str = "COMPANYDIR";
/// Id of the product folder in the start menu.
pub const PROGRAM_MENU_DIR_ID: &str = "ApplicationProgramsFolder";
/// Id of the company folder in the start menu.
pub const PROGRAM_MENU_COMPANY_DIR_ID: &str = "ApplicationCompanyProgramsFolder";

/// Derives a name-based identifier body from the upgrade code.
fn derived_uuid(upgrade_code: &Uuid, kind: &str, relative: &str) -> Uuid {
    Uuid::new_v5(upgrade_code, format!("{kind}/{relative}").as_bytes())
}

fn derived_id(prefix: &str, upgrade_code: &Uuid, kind: &str, relative: &str) -> String {
    format!(
        "{prefix}_{}",
        derived_uuid(upgrade_code, kind, relative).simple()
    )
}

/// Relative path with `/` separators, used as identifier seed.
fn id_seed(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// How upgrades of an installed product are handled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MajorUpgradeStrategy {
    /// Remove the installed version first; refuse downgrades with a message.
    Default {
        /// Shown when a newer version is already installed
        downgrade_error_message: String,
    },
}

impl Default for MajorUpgradeStrategy {
    fn default() -> Self {
        MajorUpgradeStrategy::Default {
            downgrade_error_message: "A newer version of [ProductName] is already installed."
                .into(),
        }
    }
}

/// Built-in WiX dialog set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WixUi {
    /// `WixUI_InstallDir`: license and install-directory dialogs.
    #[default]
    InstallDir,
}

impl WixUi {
    /// `UIRef` id.
    pub fn as_str(&self) -> &'static str {
        match self {
            WixUi::InstallDir => "WixUI_InstallDir",
        }
    }
}

/// Add/Remove Programs metadata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ControlPanelInfo {
    /// `ARPURLINFOABOUT`
    pub url_info_about: Option<String>,
    /// `ARPURLUPDATEINFO`
    pub url_update_info: Option<String>,
}

/// Product and package metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageInfo {
    /// Product name
    pub name: String,
    /// Company name
    pub manufacturer: String,
    /// `"{company} - {product}"`
    pub description: String,
    /// Product version
    pub version: ProductVersion,
    /// Stable across versions of the product line
    pub upgrade_code: Uuid,
    /// Target platform
    pub platform: Platform,
    /// Install scope
    pub scope: InstallScope,
}

/// A file installed by its own component.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WixFile {
    /// `File/@Id`
    pub id: String,
    /// Installed file name
    pub name: String,
    /// Source path on the build machine
    pub source: PathBuf,
}

/// One component holding exactly one file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WixComponent {
    /// `Component/@Id`
    pub id: String,
    /// `Component/@Guid`
    pub guid: Uuid,
    /// The component's file
    pub file: WixFile,
    /// Whether this is the main executable
    pub is_main: bool,
}

/// Component that only creates (and for per-user installs removes) its folder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FolderComponent {
    /// `Component/@Id`
    pub id: String,
    /// `Component/@Guid`
    pub guid: Uuid,
}

/// A directory of the install tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WixDirectory {
    /// `Directory/@Id`
    pub id: String,
    /// Directory name
    pub name: String,
    /// One component per file, in tree order
    pub components: Vec<WixComponent>,
    /// Present for empty directories and for per-user installs
    pub folder: Option<FolderComponent>,
    /// Subdirectories, in tree order
    pub children: Vec<WixDirectory>,
}

impl WixDirectory {
    fn from_tree(
        node: &DirectoryTree,
        upgrade_code: &Uuid,
        product_name: &str,
        per_user: bool,
        main_source: &Path,
    ) -> Self {
        let seed = id_seed(node.relative_path());
        let (id, name) = if node.is_root() {
            (INSTALL_DIR_ID.to_string(), product_name.to_string())
        } else {
            (
                derived_id("dir", upgrade_code, "directory", &seed),
                node.name().to_string(),
            )
        };

        let components = node
            .files()
            .files()
            .iter()
            .map(|source| {
                let name = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let relative = if seed.is_empty() {
                    name.clone()
                } else {
                    format!("{seed}/{name}")
                };
                WixComponent {
                    id: derived_id("cmp", upgrade_code, "component", &relative),
                    guid: derived_uuid(upgrade_code, "component", &relative),
                    file: WixFile {
                        id: derived_id("fil", upgrade_code, "file", &relative),
                        name,
                        source: source.clone(),
                    },
                    is_main: source == main_source,
                }
            })
            .collect::<Vec<_>>();

        let folder = (per_user || components.is_empty()).then(|| FolderComponent {
            id: derived_id("cmp", upgrade_code, "folder", &seed),
            guid: derived_uuid(upgrade_code, "folder", &seed),
        });

        let children = node
            .children()
            .iter()
            .map(|child| Self::from_tree(child, upgrade_code, product_name, per_user, main_source))
            .collect();

        Self {
            id,
            name,
            components,
            folder,
            children,
        }
    }

    /// All directories in pre-order, starting with `self`.
    pub fn nodes(&self) -> Vec<&WixDirectory> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.nodes());
        }
        out
    }
}

/// Component holding the desktop and start-menu shortcuts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortcutComponent {
    /// `Component/@Id`
    pub id: String,
    /// `Component/@Guid`
    pub guid: Uuid,
    /// The shortcuts
    pub shortcuts: Vec<Shortcut>,
}

/// Declarative package description.
#[derive(Clone, Debug)]
pub struct WixProject {
    /// Product and package metadata
    pub package: PackageInfo,
    /// Upgrade handling
    pub upgrade: MajorUpgradeStrategy,
    /// ARP metadata
    pub control_panel: ControlPanelInfo,
    /// Dialog set
    pub ui: WixUi,
    /// License shown by the UI (RTF)
    pub license_file: PathBuf,
    /// Install decisions shared with the script form
    pub policy: InstallPolicy,
    /// `INSTALLDIR` and the mirrored tree below it
    pub install_dir: WixDirectory,
    /// `File/@Id` of the main executable
    pub main_file_id: String,
    /// Present for desktop apps
    pub shortcut_component: Option<ShortcutComponent>,
    /// Whether to emit source only or compile a package
    pub output_kind: OutputKind,
    /// `{product}_{version}`
    pub base_name: String,
}

impl WixProject {
    /// Builds the object graph from the mirrored tree and install policy.
    pub fn from_context(ctx: &DescriptionContext<'_>) -> Self {
        let config = ctx.config;
        let upgrade_code = ctx.product_guid;
        let per_user = ctx.policy.is_per_user();

        let install_dir = WixDirectory::from_tree(
            ctx.tree,
            &upgrade_code,
            config.product_name(),
            per_user,
            &ctx.main_source,
        );

        let main_file_id = derived_id(
            "fil",
            &upgrade_code,
            "file",
            &ctx.main_executable.replace('\\', "/"),
        );

        let shortcut_component = match &ctx.policy.entry_points {
            EntryPoints::Shortcuts(shortcuts) => Some(ShortcutComponent {
                id: derived_id("cmp", &upgrade_code, "shortcuts", ""),
                guid: derived_uuid(&upgrade_code, "shortcuts", ""),
                shortcuts: shortcuts.clone(),
            }),
            EntryPoints::Service(_) => None,
        };

        Self {
            package: PackageInfo {
                name: config.product_name().to_string(),
                manufacturer: config.company_name().to_string(),
                description: config.description(),
                version: ctx.version.clone(),
                upgrade_code,
                platform: config.platform(),
                scope: config.install_scope(),
            },
            upgrade: MajorUpgradeStrategy::default(),
            control_panel: ControlPanelInfo {
                url_info_about: config.url_info_about().map(str::to_string),
                url_update_info: config.url_update_info().map(str::to_string),
            },
            ui: WixUi::default(),
            license_file: ctx.license_file.clone(),
            policy: ctx.policy.clone(),
            install_dir,
            main_file_id,
            shortcut_component,
            output_kind: config.output_kind(),
            base_name: config.output_base_name(),
        }
    }

    /// Shortcuts, empty for services.
    pub fn shortcuts(&self) -> &[Shortcut] {
        self.policy.entry_points.shortcuts()
    }

    /// Service registration attached to the main executable.
    pub fn service(&self) -> Option<&ServiceRegistration> {
        self.policy.entry_points.service()
    }

    /// Ids of every component, in feature order.
    pub fn component_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for dir in self.install_dir.nodes() {
            ids.extend(dir.components.iter().map(|c| c.id.as_str()));
            ids.extend(dir.folder.as_ref().map(|f| f.id.as_str()));
        }
        ids.extend(self.shortcut_component.as_ref().map(|c| c.id.as_str()));
        ids
    }

    /// File name of the artifact.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.output_kind.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_stable_and_valid() {
        let code = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let a = derived_id("fil", &code, "file", "docs/manual.pdf");
        let b = derived_id("fil", &code, "file", "docs/manual.pdf");
        assert_eq!(a, b);
        assert_eq!(a.len(), 36);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert_ne!(a, derived_id("fil", &code, "file", "a.exe"));
    }

    #[test]
    fn seed_uses_forward_slashes() {
        assert_eq!(id_seed(Path::new("docs").join("sub").as_path()), "docs/sub");
        assert_eq!(id_seed(Path::new("")), "");
    }
}
