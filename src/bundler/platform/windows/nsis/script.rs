//! NSIS installer script generation.
//!
//! The script is modelled as two ordered statement lists (install and
//! uninstall section) plus a side-table of the uninstall registry values.
//! Rendering goes through the handlebars template in [`super::template`].

use super::{
    template::{NSI_TEMPLATE, NSI_TEMPLATE_NAME},
    utils::{escape, quote},
};
use crate::bundler::{
    error::{Context, Error, Result},
    platform::{
        DescriptionContext,
        windows::{
            Elevation, EntryPoints, InstallPolicy, InstallRoot, RegistryRoot, ServiceRegistration,
            Shortcut, ShortcutLocation,
        },
    },
    settings::ProductVersion,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::{fmt, path::PathBuf};

/// Registry key holding per-product uninstall entries.
pub const UNINSTALL_KEY_PREFIX: &str = r"Software\Microsoft\Windows\CurrentVersion\Uninstall";

/// Uninstaller written into the install directory.
pub const UNINSTALLER: &str = r"$INSTDIR\Uninstall.exe";

/// One line of an NSIS section.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NsisStatement {
    /// `; text`
    Comment(String),
    /// `SetShellVarContext all`
    SetShellVarContextAll,
    /// `SetOutPath "dir"` (also creates the directory)
    SetOutPath(String),
    /// `File "source"`
    File(PathBuf),
    /// `CreateDirectory "dir"`
    CreateDirectory(String),
    /// `CreateShortCut "link" "target" ...`
    CreateShortcut {
        /// `.lnk` path
        link: String,
        /// Target executable
        target: String,
        /// Shortcut comment
        description: String,
    },
    /// `ExecWait 'command' $0`, backtick-quoted when the command holds `'`
    ExecWait(String),
    /// `WriteUninstaller "path"`
    WriteUninstaller(String),
    /// `WriteRegStr` / `WriteRegDWORD` for one registry value
    WriteRegistry {
        /// Hive
        root: RegistryRoot,
        /// Subkey
        key: String,
        /// Value
        entry: RegistryEntry,
    },
    /// `Delete "file"`
    Delete(String),
    /// `RMDir /r "dir"`
    RemoveDirRecursive(String),
    /// `DeleteRegKey root "key"`
    DeleteRegKey {
        /// Hive
        root: RegistryRoot,
        /// Subkey
        key: String,
    },
}

impl fmt::Display for NsisStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NsisStatement::Comment(text) => write!(f, "; {text}"),
            NsisStatement::SetShellVarContextAll => f.write_str("SetShellVarContext all"),
            NsisStatement::SetOutPath(dir) => write!(f, "SetOutPath {}", quote(dir)),
            NsisStatement::File(source) => {
                write!(f, "File {}", quote(&source.display().to_string()))
            }
            NsisStatement::CreateDirectory(dir) => write!(f, "CreateDirectory {}", quote(dir)),
            NsisStatement::CreateShortcut {
                link,
                target,
                description,
            } => write!(
                f,
                "CreateShortCut {} {} \"\" {} 0 SW_SHOWNORMAL \"\" {}",
                quote(link),
                quote(target),
                quote(target),
                quote(description)
            ),
            NsisStatement::ExecWait(command) => {
                let delimiter = if command.contains('\'') { '`' } else { '\'' };
                write!(f, "ExecWait {delimiter}{command}{delimiter} $0")
            }
            NsisStatement::WriteUninstaller(path) => write!(f, "WriteUninstaller {}", quote(path)),
            NsisStatement::WriteRegistry { root, key, entry } => match &entry.value {
                RegistryValue::String(value) => write!(
                    f,
                    "WriteRegStr {} {} {} {}",
                    root.as_str(),
                    quote(key),
                    quote(entry.name),
                    quote(value)
                ),
                RegistryValue::Dword(value) => write!(
                    f,
                    "WriteRegDWORD {} {} {} {value}",
                    root.as_str(),
                    quote(key),
                    quote(entry.name)
                ),
            },
            NsisStatement::Delete(path) => write!(f, "Delete {}", quote(path)),
            NsisStatement::RemoveDirRecursive(dir) => write!(f, "RMDir /r {}", quote(dir)),
            NsisStatement::DeleteRegKey { root, key } => {
                write!(f, "DeleteRegKey {} {}", root.as_str(), quote(key))
            }
        }
    }
}

/// Typed registry value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistryValue {
    /// `REG_SZ`
    String(String),
    /// `REG_DWORD`
    Dword(u32),
}

/// One value under the uninstall key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryEntry {
    /// Value name, e.g. `DisplayName`
    pub name: &'static str,
    /// Value data
    pub value: RegistryValue,
}

impl RegistryEntry {
    fn string(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: RegistryValue::String(value.into()),
        }
    }

    fn dword(name: &'static str, value: u32) -> Self {
        Self {
            name,
            value: RegistryValue::Dword(value),
        }
    }
}

/// Generated NSIS installer script.
#[derive(Clone, Debug)]
pub struct NsisScript {
    name: String,
    publisher: String,
    description: String,
    version: ProductVersion,
    out_file: PathBuf,
    install_dir: String,
    license_file: PathBuf,
    policy: InstallPolicy,
    uninstall_key: String,
    registry: Vec<RegistryEntry>,
    install: Vec<NsisStatement>,
    uninstall: Vec<NsisStatement>,
    script_file_name: String,
}

impl NsisScript {
    /// Builds the script from the mirrored tree and install policy.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when a service command would contain both `'`
    /// and `` ` ``, leaving no NSIS quote character to wrap it in.
    pub fn from_context(ctx: &DescriptionContext<'_>) -> Result<Self> {
        let config = ctx.config;
        let policy = ctx.policy.clone();
        let registry_root = policy.registry_root;
        let uninstall_key = format!(
            r"{UNINSTALL_KEY_PREFIX}\{}",
            config.product_guid().trim().trim_matches(['{', '}'])
        );
        let main_exe = format!(r"$INSTDIR\{}", ctx.main_executable);

        let mut registry = vec![
            RegistryEntry::string("DisplayName", config.product_name()),
            RegistryEntry::string("UninstallString", UNINSTALLER),
            RegistryEntry::string("DisplayVersion", config.product_version()),
            RegistryEntry::string("Publisher", config.company_name()),
            RegistryEntry::string("InstallLocation", "$INSTDIR"),
        ];
        if let Some(url) = config.url_info_about() {
            registry.push(RegistryEntry::string("URLInfoAbout", url));
        }
        if let Some(url) = config.url_update_info() {
            registry.push(RegistryEntry::string("HelpLink", url));
        }
        registry.push(RegistryEntry::string("DisplayIcon", main_exe.as_str()));
        registry.push(RegistryEntry::dword("NoModify", 1));
        registry.push(RegistryEntry::dword("NoRepair", 1));

        let mut install = Vec::new();
        let mut uninstall = Vec::new();
        if !policy.is_per_user() {
            install.push(NsisStatement::SetShellVarContextAll);
            uninstall.push(NsisStatement::SetShellVarContextAll);
        }

        for node in ctx.tree.nodes() {
            install.push(NsisStatement::SetOutPath(install_path(
                &node.relative_path().to_string_lossy(),
            )));
            install.extend(node.files().files().iter().cloned().map(NsisStatement::File));
        }

        let start_menu_dir = format!(
            r"$SMPROGRAMS\{}\{}",
            policy.company_folder, policy.product_folder
        );

        match &policy.entry_points {
            EntryPoints::Shortcuts(shortcuts) => {
                install.push(NsisStatement::SetOutPath("$INSTDIR".into()));
                for shortcut in shortcuts {
                    if shortcut.location == ShortcutLocation::StartMenu {
                        install.push(NsisStatement::CreateDirectory(start_menu_dir.clone()));
                    }
                    install.push(NsisStatement::CreateShortcut {
                        link: shortcut_link(shortcut, &start_menu_dir),
                        target: format!(r"$INSTDIR\{}", shortcut.target),
                        description: shortcut.description.clone(),
                    });
                }

                for shortcut in shortcuts {
                    uninstall.push(NsisStatement::Delete(shortcut_link(shortcut, &start_menu_dir)));
                }
                uninstall.push(NsisStatement::RemoveDirRecursive(start_menu_dir));
            }
            EntryPoints::Service(service) => {
                let unquotable = service_install_commands(service)
                    .chain(service_remove_commands(service))
                    .any(|command| command.contains('\'') && command.contains('`'));
                if unquotable {
                    return Err(Error::InvalidConfiguration(format!(
                        "service name or description of '{}' cannot contain both ' and `",
                        service.name
                    )));
                }

                install.push(NsisStatement::Comment(
                    "Install Windows service using sc.exe".into(),
                ));
                install.extend(service_install_commands(service).map(NsisStatement::ExecWait));

                uninstall.push(NsisStatement::Comment("Stop and delete service".into()));
                uninstall.extend(service_remove_commands(service).map(NsisStatement::ExecWait));
            }
        }

        install.push(NsisStatement::WriteUninstaller(UNINSTALLER.into()));
        install.push(NsisStatement::Comment(format!(
            "Register in Add/Remove Programs ({})",
            registry_root.as_str()
        )));
        install.extend(registry.iter().cloned().map(|entry| NsisStatement::WriteRegistry {
            root: registry_root,
            key: uninstall_key.clone(),
            entry,
        }));

        uninstall.push(NsisStatement::RemoveDirRecursive("$INSTDIR".into()));
        uninstall.push(NsisStatement::DeleteRegKey {
            root: registry_root,
            key: uninstall_key.clone(),
        });

        Ok(Self {
            name: config.product_name().to_string(),
            publisher: config.company_name().to_string(),
            description: config.description(),
            version: ctx.version.clone(),
            out_file: ctx.output_directory.join(config.output_file_name()),
            install_dir: format!(
                r"{}\{}\{}",
                install_root_variable(policy.install_root),
                policy.company_folder,
                policy.product_folder
            ),
            license_file: ctx.license_file.clone(),
            policy,
            uninstall_key,
            registry,
            install,
            uninstall,
            script_file_name: format!("{}.nsi", config.output_base_name()),
        })
    }

    /// Install and elevation decisions this script encodes.
    pub fn policy(&self) -> &InstallPolicy {
        &self.policy
    }

    /// `InstallDir` value, e.g. `$PROGRAMFILES64\Acme\Widget`.
    pub fn install_dir(&self) -> &str {
        &self.install_dir
    }

    /// `RequestExecutionLevel` value.
    pub fn execution_level(&self) -> &'static str {
        match self.policy.elevation {
            Elevation::Administrator => "admin",
            Elevation::User => "user",
        }
    }

    /// Uninstall key, `Software\...\Uninstall\{guid}` without braces.
    pub fn uninstall_key(&self) -> &str {
        &self.uninstall_key
    }

    /// Values written under the uninstall key, in write order.
    pub fn registry(&self) -> &[RegistryEntry] {
        &self.registry
    }

    /// Install section statements.
    pub fn install(&self) -> &[NsisStatement] {
        &self.install
    }

    /// Uninstall section statements.
    pub fn uninstall(&self) -> &[NsisStatement] {
        &self.uninstall
    }

    /// Absolute path of the installer `OutFile`.
    pub fn out_file(&self) -> &std::path::Path {
        &self.out_file
    }

    /// `{product}_{version}.nsi`
    pub fn script_file_name(&self) -> &str {
        &self.script_file_name
    }

    /// Renders the full `.nsi` text.
    pub fn render(&self) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(NSI_TEMPLATE_NAME, NSI_TEMPLATE)
            .context("failed to register NSI template")?;

        let data = TemplateData {
            name: escape(&self.name),
            publisher: escape(&self.publisher),
            description: escape(&self.description),
            version: self.version.to_string(),
            version_nsis: self.version.four_part(),
            out_file: escape(&self.out_file.display().to_string()),
            install_dir: escape(&self.install_dir),
            execution_level: self.execution_level(),
            license_file: escape(&self.license_file.display().to_string()),
            install_section: render_section(&self.install),
            uninstall_section: render_section(&self.uninstall),
        };

        Ok(handlebars.render(NSI_TEMPLATE_NAME, &data)?)
    }
}

/// Values substituted into the `.nsi` template.
#[derive(Serialize)]
struct TemplateData {
    name: String,
    publisher: String,
    description: String,
    version: String,
    version_nsis: String,
    out_file: String,
    install_dir: String,
    execution_level: &'static str,
    license_file: String,
    install_section: String,
    uninstall_section: String,
}

fn render_section(statements: &[NsisStatement]) -> String {
    statements
        .iter()
        .map(|statement| format!("  {statement}\n"))
        .collect()
}

fn install_root_variable(root: InstallRoot) -> &'static str {
    match root {
        InstallRoot::LocalAppData => "$LOCALAPPDATA",
        InstallRoot::ProgramFiles { is_64bit: true } => "$PROGRAMFILES64",
        InstallRoot::ProgramFiles { is_64bit: false } => "$PROGRAMFILES",
    }
}

fn install_path(relative: &str) -> String {
    let relative = relative.replace('/', "\\");
    if relative.is_empty() {
        "$INSTDIR".to_string()
    } else {
        format!(r"$INSTDIR\{relative}")
    }
}

fn shortcut_link(shortcut: &Shortcut, start_menu_dir: &str) -> String {
    match shortcut.location {
        ShortcutLocation::Desktop => format!(r"$DESKTOP\{}.lnk", shortcut.name),
        ShortcutLocation::StartMenu => format!(r"{start_menu_dir}\{}.lnk", shortcut.name),
    }
}

fn service_install_commands(service: &ServiceRegistration) -> impl Iterator<Item = String> {
    let name = quote(&service.name);
    let delay_ms = service.restart_delay.as_millis();
    let actions = service
        .failure_actions
        .iter()
        .map(|_| format!("restart/{delay_ms}"))
        .collect::<Vec<_>>()
        .join("/");
    let start = if service.delayed_auto_start {
        "delayed-auto"
    } else {
        "auto"
    };

    [
        format!(
            "sc create {name} binPath= {} start= auto",
            quote(&format!(r"$INSTDIR\{}", service.executable))
        ),
        format!("sc description {name} {}", quote(&service.description)),
        format!("sc failure {name} reset= 86400 actions= {actions}"),
        format!("sc config {name} start= {start}"),
        format!("sc start {name}"),
    ]
    .into_iter()
}

fn service_remove_commands(service: &ServiceRegistration) -> impl Iterator<Item = String> {
    let name = quote(&service.name);
    [format!("sc stop {name}"), format!("sc delete {name}")].into_iter()
}
