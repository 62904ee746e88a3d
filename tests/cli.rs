//! End-to-end runs of the `msi_creator` binary.

mod common;

use assert_cmd::Command;
use common::{PRODUCT_GUID, Workspace};
use predicates::prelude::*;
use std::path::PathBuf;

fn msi_creator() -> Command {
    let mut cmd = Command::cargo_bin("msi_creator").unwrap();
    cmd.env_remove("WIX").env_remove("NSISDIR");
    cmd
}

fn wxs_args(ws: &Workspace) -> Vec<String> {
    vec![
        "-CompanyName".into(),
        "Acme".into(),
        "-Product".into(),
        "Widget".into(),
        "-Version".into(),
        "1.2.3".into(),
        "-SrcBinDirectory".into(),
        ws.bin().display().to_string(),
        "-OutputDirectory".into(),
        ws.out().display().to_string(),
        "-MainExecutable".into(),
        "a.exe".into(),
        "-ProductGuid".into(),
        PRODUCT_GUID.into(),
        "-LicenseFile".into(),
        ws.license().display().to_string(),
        "-OutputType".into(),
        "wxs".into(),
    ]
}

fn printed_path(output: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(output).trim())
}

#[test]
fn help_exits_zero() {
    msi_creator()
        .arg("-Help")
        .assert()
        .success()
        .stdout(predicate::str::contains("-CompanyName").or(predicate::str::contains("--CompanyName")));
}

#[test]
fn unknown_argument_exits_one() {
    msi_creator().args(["-Bogus", "1"]).assert().code(1);
}

#[test]
fn bogus_output_type_exits_one() {
    msi_creator()
        .args(["-OutputType", "bogus"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("bogus"));
}

#[test]
fn missing_fields_are_named_on_stdout() {
    let ws = Workspace::new();
    msi_creator()
        .args(["-CompanyName", "Acme", "-LicenseFile"])
        .arg(ws.license())
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("Product")
                .and(predicate::str::contains("Version"))
                .and(predicate::str::contains("SrcBinDirectory or SrcZip"))
                .and(predicate::str::contains("MainExecutable"))
                .and(predicate::str::contains("ProductGuid"))
                .and(predicate::str::contains("CompanyName").not()),
        );
}

#[test]
fn writes_wix_source_for_a_desktop_app() {
    let ws = Workspace::new();
    let assert = msi_creator().args(wxs_args(&ws)).assert().success();

    let path = printed_path(&assert.get_output().stdout);
    assert!(path.is_absolute());
    assert_eq!(path, ws.out().join("Widget_1.2.3.wxs"));

    let wxs = std::fs::read_to_string(&path).unwrap();
    assert_eq!(wxs.matches("<Shortcut ").count(), 2);
    assert!(!wxs.contains("ServiceInstall"));
    assert!(wxs.contains("manual.pdf"));
}

#[test]
fn flags_are_case_insensitive_and_service_mode_drops_shortcuts() {
    let ws = Workspace::new();
    let mut args: Vec<String> = wxs_args(&ws)
        .into_iter()
        .map(|a| if a.starts_with('-') { a.to_lowercase() } else { a })
        .collect();
    args.extend(["--ISSERVICE".into(), "yes".into()]);

    let assert = msi_creator().args(args).assert().success();
    let wxs = std::fs::read_to_string(printed_path(&assert.get_output().stdout)).unwrap();

    assert!(!wxs.contains("<Shortcut "));
    assert!(wxs.contains("ServiceInstall"));
    assert!(wxs.contains(r#"RestartServiceDelayInSeconds="600""#));
}

#[test]
fn builds_without_a_license_flag() {
    let ws = Workspace::new();
    let mut args = wxs_args(&ws);
    let flag = args.iter().position(|a| a == "-LicenseFile").unwrap();
    args.drain(flag..flag + 2);

    let assert = msi_creator().args(args).assert().success();
    let path = printed_path(&assert.get_output().stdout);
    let wxs = std::fs::read_to_string(path).unwrap();
    assert!(wxs.contains(r#"<WixVariable Id="WixUILicenseRtf""#));
}

#[test]
fn main_executable_outside_the_tree_is_a_usage_error() {
    let ws = Workspace::new();
    let mut args = wxs_args(&ws);
    let exe = args.iter().position(|a| a == "-MainExecutable").unwrap() + 1;
    args[exe] = "missing.exe".into();

    msi_creator()
        .args(args)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing.exe").and(predicate::str::contains("-Help")));
}

#[test]
fn missing_source_directory_fails() {
    let ws = Workspace::new();
    let mut args = wxs_args(&ws);
    let dir = args.iter().position(|a| a == "-SrcBinDirectory").unwrap() + 1;
    args[dir] = ws.path().join("nope").display().to_string();

    msi_creator()
        .args(args)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("source directory not found"));
}
