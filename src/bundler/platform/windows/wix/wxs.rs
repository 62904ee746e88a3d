//! WiX v3 source (`.wxs`) serialization.

use super::model::{
    COMPANY_DIR_ID, FolderComponent, INSTALL_DIR_ID, MajorUpgradeStrategy,
    PROGRAM_MENU_COMPANY_DIR_ID, PROGRAM_MENU_DIR_ID, ShortcutComponent, WixComponent,
    WixDirectory, WixProject,
};
use crate::bundler::{
    error::{Error, Result},
    platform::windows::{Elevation, InstallRoot, ServiceEvent, ServiceRegistration, ShortcutLocation},
    settings::InstallScope,
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};

/// WiX v3 namespace.
pub const WIX_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/wi";
/// WiX v3 util extension namespace.
pub const UTIL_NAMESPACE: &str = "http://schemas.microsoft.com/wix/UtilExtension";

struct WxsWriter {
    inner: Writer<Vec<u8>>,
}

impl WxsWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| Error::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| Error::Xml(e.to_string()))
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn event_name(event: ServiceEvent) -> &'static str {
    match event {
        ServiceEvent::Install => "install",
        ServiceEvent::Uninstall => "uninstall",
        ServiceEvent::Both => "both",
    }
}

/// Registry key used as key path for components without a file key path.
fn user_key(project: &WixProject) -> String {
    format!(
        r"Software\{}\{}",
        project.package.manufacturer, project.package.name
    )
}

/// Serializes the project to WiX v3 source text.
pub fn to_wxs(project: &WixProject) -> Result<String> {
    let mut w = WxsWriter::new();
    let package = &project.package;
    let upgrade_code = package.upgrade_code.hyphenated().to_string().to_uppercase();
    let version = package.version.to_string();

    w.write(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    if project.service().is_some() {
        w.start("Wix", &[("xmlns", WIX_NAMESPACE), ("xmlns:util", UTIL_NAMESPACE)])?;
    } else {
        w.start("Wix", &[("xmlns", WIX_NAMESPACE)])?;
    }

    w.start(
        "Product",
        &[
            ("Id", "*"),
            ("Name", package.name.as_str()),
            ("Language", "1033"),
            ("Version", version.as_str()),
            ("Manufacturer", package.manufacturer.as_str()),
            ("UpgradeCode", upgrade_code.as_str()),
        ],
    )?;

    let platform = package.platform.as_str();
    let mut package_attrs = vec![
        ("InstallerVersion", "500"),
        ("Compressed", "yes"),
        ("Platform", platform),
        ("Description", package.description.as_str()),
        ("Manufacturer", package.manufacturer.as_str()),
    ];
    let elevated = project.policy.elevation == Elevation::Administrator;
    match package.scope {
        // A per-user service still needs admin rights; `perUser` would force limited privileges.
        InstallScope::PerUser if elevated => package_attrs.push(("InstallPrivileges", "elevated")),
        InstallScope::PerUser => package_attrs.push(("InstallScope", "perUser")),
        InstallScope::PerMachine => package_attrs.push(("InstallScope", "perMachine")),
        InstallScope::PerUserOrMachine => package_attrs.push(("InstallPrivileges", "elevated")),
    }
    w.empty("Package", &package_attrs)?;
    if package.scope == InstallScope::PerUserOrMachine {
        w.empty("Property", &[("Id", "ALLUSERS"), ("Value", "2")])?;
    }

    match &project.upgrade {
        MajorUpgradeStrategy::Default {
            downgrade_error_message,
        } => w.empty(
            "MajorUpgrade",
            &[("DowngradeErrorMessage", downgrade_error_message.as_str())],
        )?,
    }
    w.empty("MediaTemplate", &[("EmbedCab", "yes")])?;

    if let Some(url) = &project.control_panel.url_info_about {
        w.empty("Property", &[("Id", "ARPURLINFOABOUT"), ("Value", url.as_str())])?;
    }
    if let Some(url) = &project.control_panel.url_update_info {
        w.empty("Property", &[("Id", "ARPURLUPDATEINFO"), ("Value", url.as_str())])?;
    }

    write_directories(&mut w, project)?;

    w.start(
        "Feature",
        &[("Id", "MainFeature"), ("Title", package.name.as_str()), ("Level", "1")],
    )?;
    for id in project.component_ids() {
        w.empty("ComponentRef", &[("Id", id)])?;
    }
    w.end("Feature")?;

    w.empty("Property", &[("Id", "WIXUI_INSTALLDIR"), ("Value", INSTALL_DIR_ID)])?;
    w.empty("UIRef", &[("Id", project.ui.as_str())])?;
    let license = project.license_file.display().to_string();
    w.empty("WixVariable", &[("Id", "WixUILicenseRtf"), ("Value", license.as_str())])?;

    w.end("Product")?;
    w.end("Wix")?;
    w.finish()
}

fn write_directories(w: &mut WxsWriter, project: &WixProject) -> Result<()> {
    let root_id = match project.policy.install_root {
        InstallRoot::LocalAppData => "LocalAppDataFolder",
        InstallRoot::ProgramFiles { is_64bit: true } => "ProgramFiles64Folder",
        InstallRoot::ProgramFiles { is_64bit: false } => "ProgramFilesFolder",
    };

    w.start("Directory", &[("Id", "TARGETDIR"), ("Name", "SourceDir")])?;
    w.start("Directory", &[("Id", root_id)])?;
    w.start(
        "Directory",
        &[("Id", COMPANY_DIR_ID), ("Name", project.policy.company_folder.as_str())],
    )?;
    write_directory(w, project, &project.install_dir)?;
    w.end("Directory")?;
    w.end("Directory")?;

    if let Some(component) = &project.shortcut_component {
        let has_desktop = component
            .shortcuts
            .iter()
            .any(|s| s.location == ShortcutLocation::Desktop);
        if has_desktop {
            w.empty("Directory", &[("Id", "DesktopFolder"), ("Name", "Desktop")])?;
        }

        w.start("Directory", &[("Id", "ProgramMenuFolder")])?;
        w.start(
            "Directory",
            &[
                ("Id", PROGRAM_MENU_COMPANY_DIR_ID),
                ("Name", project.policy.company_folder.as_str()),
            ],
        )?;
        w.start(
            "Directory",
            &[
                ("Id", PROGRAM_MENU_DIR_ID),
                ("Name", project.policy.product_folder.as_str()),
            ],
        )?;
        write_shortcut_component(w, project, component)?;
        w.end("Directory")?;
        w.end("Directory")?;
        w.end("Directory")?;
    }

    w.end("Directory")
}

fn write_directory(w: &mut WxsWriter, project: &WixProject, dir: &WixDirectory) -> Result<()> {
    w.start("Directory", &[("Id", dir.id.as_str()), ("Name", dir.name.as_str())])?;
    for component in &dir.components {
        write_file_component(w, project, component)?;
    }
    if let Some(folder) = &dir.folder {
        write_folder_component(w, project, dir, folder)?;
    }
    for child in &dir.children {
        write_directory(w, project, child)?;
    }
    w.end("Directory")
}

fn write_file_component(
    w: &mut WxsWriter,
    project: &WixProject,
    component: &WixComponent,
) -> Result<()> {
    let guid = component.guid.hyphenated().to_string().to_uppercase();
    w.start("Component", &[("Id", component.id.as_str()), ("Guid", guid.as_str())])?;

    let service = project.service().filter(|_| component.is_main);
    // Services need the file as key path; per-user components key on HKCU.
    let user_keyed = project.policy.is_per_user() && service.is_none();

    let source = component.file.source.display().to_string();
    w.empty(
        "File",
        &[
            ("Id", component.file.id.as_str()),
            ("Name", component.file.name.as_str()),
            ("Source", source.as_str()),
            ("KeyPath", yes_no(!user_keyed)),
        ],
    )?;
    if user_keyed {
        write_key_path(w, project, &component.id)?;
    }
    if let Some(service) = service {
        write_service(w, service)?;
    }

    w.end("Component")
}

fn write_folder_component(
    w: &mut WxsWriter,
    project: &WixProject,
    dir: &WixDirectory,
    folder: &FolderComponent,
) -> Result<()> {
    let guid = folder.guid.hyphenated().to_string().to_uppercase();
    w.start("Component", &[("Id", folder.id.as_str()), ("Guid", guid.as_str())])?;
    w.empty("CreateFolder", &[])?;
    if project.policy.is_per_user() {
        let remove_id = format!("rmv_{}", dir.id);
        w.empty("RemoveFolder", &[("Id", remove_id.as_str()), ("On", "uninstall")])?;
        if dir.id == INSTALL_DIR_ID {
            w.empty(
                "RemoveFolder",
                &[
                    ("Id", "rmv_company"),
                    ("Directory", COMPANY_DIR_ID),
                    ("On", "uninstall"),
                ],
            )?;
        }
        write_key_path(w, project, &folder.id)?;
    }
    w.end("Component")
}

/// `HKCU` for per-user packages, `HKMU` (follows `ALLUSERS`) otherwise.
fn key_path_root(project: &WixProject) -> &'static str {
    if project.policy.is_per_user() {
        "HKCU"
    } else {
        "HKMU"
    }
}

fn write_key_path(w: &mut WxsWriter, project: &WixProject, name: &str) -> Result<()> {
    let key = user_key(project);
    w.empty(
        "RegistryValue",
        &[
            ("Root", key_path_root(project)),
            ("Key", key.as_str()),
            ("Name", name),
            ("Type", "integer"),
            ("Value", "1"),
            ("KeyPath", "yes"),
        ],
    )
}

fn write_shortcut_component(
    w: &mut WxsWriter,
    project: &WixProject,
    component: &ShortcutComponent,
) -> Result<()> {
    let guid = component.guid.hyphenated().to_string().to_uppercase();
    let target = format!("[#{}]", project.main_file_id);
    w.start("Component", &[("Id", component.id.as_str()), ("Guid", guid.as_str())])?;

    for shortcut in &component.shortcuts {
        let (id, directory) = match shortcut.location {
            ShortcutLocation::Desktop => ("DesktopShortcut", "DesktopFolder"),
            ShortcutLocation::StartMenu => ("StartMenuShortcut", PROGRAM_MENU_DIR_ID),
        };
        w.empty(
            "Shortcut",
            &[
                ("Id", id),
                ("Directory", directory),
                ("Name", shortcut.name.as_str()),
                ("Description", shortcut.description.as_str()),
                ("Target", target.as_str()),
                ("WorkingDirectory", INSTALL_DIR_ID),
            ],
        )?;
    }

    w.empty(
        "RemoveFolder",
        &[("Id", "rmv_programs"), ("Directory", PROGRAM_MENU_DIR_ID), ("On", "uninstall")],
    )?;
    w.empty(
        "RemoveFolder",
        &[
            ("Id", "rmv_programs_company"),
            ("Directory", PROGRAM_MENU_COMPANY_DIR_ID),
            ("On", "uninstall"),
        ],
    )?;
    write_key_path(w, project, &component.id)?;

    w.end("Component")
}

fn write_service(w: &mut WxsWriter, service: &ServiceRegistration) -> Result<()> {
    w.start(
        "ServiceInstall",
        &[
            ("Id", "ServiceInstaller"),
            ("Name", service.name.as_str()),
            ("DisplayName", service.name.as_str()),
            ("Description", service.description.as_str()),
            ("Type", "ownProcess"),
            ("Start", "auto"),
            ("ErrorControl", "normal"),
            ("Vital", "yes"),
        ],
    )?;
    w.empty(
        "ServiceConfig",
        &[
            ("DelayedAutoStart", yes_no(service.delayed_auto_start)),
            ("OnInstall", "yes"),
            ("OnReinstall", "yes"),
        ],
    )?;

    let [first, second, third] = service.failure_actions.map(|_| "restart");
    let delay = service.restart_delay.as_secs().to_string();
    w.empty(
        "util:ServiceConfig",
        &[
            ("FirstFailureActionType", first),
            ("SecondFailureActionType", second),
            ("ThirdFailureActionType", third),
            ("RestartServiceDelayInSeconds", delay.as_str()),
        ],
    )?;
    w.end("ServiceInstall")?;

    w.empty(
        "ServiceControl",
        &[
            ("Id", "ServiceControl"),
            ("Name", service.name.as_str()),
            ("Start", event_name(service.start_on)),
            ("Stop", event_name(service.stop_on)),
            ("Remove", event_name(service.remove_on)),
            ("Wait", "yes"),
        ],
    )
}
