//! Package descriptions built from mirrored trees.

mod common;

use common::{PRODUCT_GUID, Workspace};
use msi_creator::bundler::{
    DescriptionBuilder, DirectoryTree, Error, InstallScope, InstallerConfig,
    InstallerConfigBuilder, OutputKind, PackageDescription,
    platform::windows::{Elevation, FailureAction, ServiceEvent, ShortcutLocation},
};
use std::time::Duration;

fn config(ws: &Workspace, kind: OutputKind, is_service: bool) -> InstallerConfig {
    InstallerConfigBuilder::new()
        .company_name("Acme")
        .product_name("Widget")
        .product_version("1.2.3")
        .product_guid(PRODUCT_GUID)
        .main_executable("a.exe")
        .license_file(ws.license())
        .src_bin_directory(ws.bin())
        .output_directory(ws.out())
        .output_kind(kind)
        .is_service(is_service)
        .build()
}

fn describe(config: &InstallerConfig) -> PackageDescription {
    let tree = DirectoryTree::mirror(config.src_bin_directory().unwrap()).unwrap();
    DescriptionBuilder::new(config).build(&tree).unwrap()
}

#[test]
fn desktop_app_gets_two_shortcuts_to_the_main_executable() {
    let ws = Workspace::new();
    let description = describe(&config(&ws, OutputKind::Msi, false));

    assert_eq!(description.output_file_name(), "Widget_1.2.3.msi");
    assert!(matches!(description, PackageDescription::Declarative(_)));

    let policy = description.policy();
    let shortcuts = policy.entry_points.shortcuts();
    assert_eq!(shortcuts.len(), 2);
    assert!(shortcuts.iter().all(|s| s.target == "a.exe"));
    assert_eq!(shortcuts[0].location, ShortcutLocation::Desktop);
    assert_eq!(shortcuts[1].location, ShortcutLocation::StartMenu);
    assert!(policy.entry_points.service().is_none());
}

#[test]
fn service_gets_a_registration_and_no_shortcuts() {
    let ws = Workspace::new();
    let description = describe(&config(&ws, OutputKind::Msi, true));

    let policy = description.policy();
    assert!(policy.entry_points.shortcuts().is_empty());

    let service = policy.entry_points.service().unwrap();
    assert_eq!(service.executable, "a.exe");
    assert!(service.delayed_auto_start);
    assert_eq!(service.failure_actions, [FailureAction::Restart; 3]);
    assert_eq!(service.restart_delay, Duration::from_secs(600));
    assert_eq!(service.start_on, ServiceEvent::Install);
}

#[test]
fn base_name_is_shared_by_every_output_kind() {
    let ws = Workspace::new();
    for (kind, expected) in [
        (OutputKind::Msi, "Widget_1.2.3.msi"),
        (OutputKind::Wxs, "Widget_1.2.3.wxs"),
        (OutputKind::Exe, "Widget_1.2.3.exe"),
    ] {
        assert_eq!(describe(&config(&ws, kind, false)).output_file_name(), expected);
    }
}

#[test]
fn declarative_and_script_forms_share_install_policy() {
    let ws = Workspace::new();
    for scope in [
        InstallScope::PerUser,
        InstallScope::PerMachine,
        InstallScope::PerUserOrMachine,
    ] {
        for is_service in [false, true] {
            let build = |kind| {
                InstallerConfigBuilder::new()
                    .company_name("Acme")
                    .product_name("Widget")
                    .product_version("1.2.3")
                    .product_guid(PRODUCT_GUID)
                    .main_executable("a.exe")
                    .license_file(ws.license())
                    .src_bin_directory(ws.bin())
                    .output_directory(ws.out())
                    .output_kind(kind)
                    .install_scope(scope)
                    .is_service(is_service)
                    .build()
            };
            let msi = describe(&build(OutputKind::Msi));
            let exe = describe(&build(OutputKind::Exe));
            assert!(matches!(exe, PackageDescription::Script(_)));
            assert_eq!(msi.policy(), exe.policy());

            let expected = if scope == InstallScope::PerUser && !is_service {
                Elevation::User
            } else {
                Elevation::Administrator
            };
            assert_eq!(msi.policy().elevation, expected);
        }
    }
}

#[test]
fn main_executable_outside_the_tree_is_rejected() {
    let ws = Workspace::new();
    let config = InstallerConfigBuilder::new()
        .company_name("Acme")
        .product_name("Widget")
        .product_version("1.2.3")
        .product_guid(PRODUCT_GUID)
        .main_executable("missing.exe")
        .license_file(ws.license())
        .src_bin_directory(ws.bin())
        .output_directory(ws.out())
        .build();
    let tree = DirectoryTree::mirror(&ws.bin()).unwrap();

    let err = DescriptionBuilder::new(&config).build(&tree).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn bogus_output_kind_fails_to_parse() {
    let err = "bogus".parse::<OutputKind>().unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}
