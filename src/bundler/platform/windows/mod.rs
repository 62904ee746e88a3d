//! Windows installer descriptions.
//!
//! Both installer forms are generated from the same [`InstallPolicy`], so an
//! MSI and an NSIS executable built from one configuration agree on install
//! path, elevation, registry root and shortcut/service decisions.
//!
//! # Module Organization
//!
//! - `wix` - declarative WiX object graph, `.wxs` serialization, candle/light
//! - `nsis` - NSIS script model, template rendering, makensis

pub mod nsis;
pub mod wix;

use crate::bundler::settings::{InstallScope, InstallerConfig};
use std::time::Duration;

/// Delay before the service control manager restarts a failed service.
pub const SERVICE_RESTART_DELAY: Duration = Duration::from_secs(10 * 60);

/// Privilege level the installer requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Elevation {
    /// Runs as the invoking user.
    User,
    /// Requires an administrator.
    Administrator,
}

/// Base folder the install directory lives under.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InstallRoot {
    /// `%LOCALAPPDATA%`
    LocalAppData,
    /// `%PROGRAMFILES%` (64-bit folder unless the platform is x86)
    ProgramFiles {
        /// Whether the 64-bit program-files folder is used
        is_64bit: bool,
    },
}

/// Registry hive for the uninstall (ARP) entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistryRoot {
    /// `HKCU`
    CurrentUser,
    /// `HKLM`
    LocalMachine,
}

impl RegistryRoot {
    /// Short hive name used by NSIS and WiX.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryRoot::CurrentUser => "HKCU",
            RegistryRoot::LocalMachine => "HKLM",
        }
    }
}

/// Where a shortcut is placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShortcutLocation {
    /// The desktop.
    Desktop,
    /// `Start Menu\Programs\{company}\{product}`.
    StartMenu,
}

/// Shortcut to the main executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Shortcut {
    /// Placement
    pub location: ShortcutLocation,
    /// Link name (product name)
    pub name: String,
    /// Target, relative to the install directory
    pub target: String,
    /// `"{company} - {product}"`
    pub description: String,
}

/// Installer lifecycle events a service action is bound to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceEvent {
    /// During install.
    Install,
    /// During uninstall.
    Uninstall,
    /// During both install and uninstall.
    Both,
}

/// Service control manager action taken when the service fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureAction {
    /// Restart the service.
    Restart,
}

/// Windows service registration for the main executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceRegistration {
    /// Service name (product name)
    pub name: String,
    /// `"{company} - {product}"`
    pub description: String,
    /// Executable, relative to the install directory
    pub executable: String,
    /// Automatic start with delayed auto-start
    pub delayed_auto_start: bool,
    /// Actions for the first, second and subsequent failures
    pub failure_actions: [FailureAction; 3],
    /// Delay before a restart action runs
    pub restart_delay: Duration,
    /// When the service is started
    pub start_on: ServiceEvent,
    /// When the service is stopped
    pub stop_on: ServiceEvent,
    /// When the service is removed
    pub remove_on: ServiceEvent,
}

/// What the installer creates for the main executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryPoints {
    /// Desktop app: desktop and start-menu shortcuts.
    Shortcuts(Vec<Shortcut>),
    /// Service: a service registration, no shortcuts.
    Service(ServiceRegistration),
}

impl EntryPoints {
    /// Shortcuts, empty for services.
    pub fn shortcuts(&self) -> &[Shortcut] {
        match self {
            EntryPoints::Shortcuts(shortcuts) => shortcuts,
            EntryPoints::Service(_) => &[],
        }
    }

    /// Service registration, `None` for desktop apps.
    pub fn service(&self) -> Option<&ServiceRegistration> {
        match self {
            EntryPoints::Service(service) => Some(service),
            EntryPoints::Shortcuts(_) => None,
        }
    }
}

/// Install decisions derived from configuration alone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstallPolicy {
    /// Base folder of the install directory
    pub install_root: InstallRoot,
    /// Company folder under the install root
    pub company_folder: String,
    /// Product folder under the company folder
    pub product_folder: String,
    /// Requested privilege level
    pub elevation: Elevation,
    /// Hive of the uninstall entry
    pub registry_root: RegistryRoot,
    /// Shortcuts or service registration
    pub entry_points: EntryPoints,
}

impl InstallPolicy {
    /// Derives the policy from a configuration.
    ///
    /// - Per-user scope installs under local app data and writes to `HKCU`;
    ///   every other scope installs under program files and writes to `HKLM`.
    /// - Administrator rights are required unless the scope is per-user and
    ///   no service is installed.
    /// - Services get a registration and no shortcuts; desktop apps get a
    ///   desktop and a start-menu shortcut.
    pub fn from_config(config: &InstallerConfig) -> Self {
        let per_user = config.install_scope() == InstallScope::PerUser;

        let install_root = if per_user {
            InstallRoot::LocalAppData
        } else {
            InstallRoot::ProgramFiles {
                is_64bit: config.platform().is_64bit(),
            }
        };

        let elevation = if per_user && !config.is_service() {
            Elevation::User
        } else {
            Elevation::Administrator
        };

        let registry_root = if per_user {
            RegistryRoot::CurrentUser
        } else {
            RegistryRoot::LocalMachine
        };

        let target = normalize_relative(config.main_executable());
        let entry_points = if config.is_service() {
            EntryPoints::Service(ServiceRegistration {
                name: config.product_name().to_string(),
                description: config.description(),
                executable: target,
                delayed_auto_start: true,
                failure_actions: [FailureAction::Restart; 3],
                restart_delay: SERVICE_RESTART_DELAY,
                start_on: ServiceEvent::Install,
                stop_on: ServiceEvent::Both,
                remove_on: ServiceEvent::Uninstall,
            })
        } else {
            EntryPoints::Shortcuts(
                [ShortcutLocation::Desktop, ShortcutLocation::StartMenu]
                    .into_iter()
                    .map(|location| Shortcut {
                        location,
                        name: config.product_name().to_string(),
                        target: target.clone(),
                        description: config.description(),
                    })
                    .collect(),
            )
        };

        Self {
            install_root,
            company_folder: config.company_name().to_string(),
            product_folder: config.product_name().to_string(),
            elevation,
            registry_root,
            entry_points,
        }
    }

    /// Whether files land under the user's profile.
    pub fn is_per_user(&self) -> bool {
        self.install_root == InstallRoot::LocalAppData
    }
}

/// Converts a relative path to Windows separators without leading `.\`.
pub fn normalize_relative(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|p| !p.is_empty() && *p != ".")
        .collect::<Vec<_>>()
        .join("\\")
}
