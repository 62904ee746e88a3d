//! NSI script template.
//!
//! Values are escaped before rendering; the template is registered with
//! `handlebars::no_escape`. Section bodies arrive pre-rendered, one
//! indented statement per line.

/// Name the template is registered under.
pub const NSI_TEMPLATE_NAME: &str = "installer.nsi";

/// Modern UI 2 installer with license, directory and finish pages.
pub const NSI_TEMPLATE: &str = r#"Unicode true
!include "MUI2.nsh"

Name "{{name}}"
OutFile "{{out_file}}"
InstallDir "{{install_dir}}"
RequestExecutionLevel {{execution_level}}
SetCompressor /SOLID lzma

!insertmacro MUI_PAGE_WELCOME
!insertmacro MUI_PAGE_LICENSE "{{license_file}}"
!insertmacro MUI_PAGE_DIRECTORY
!insertmacro MUI_PAGE_INSTFILES
!insertmacro MUI_PAGE_FINISH

!insertmacro MUI_UNPAGE_CONFIRM
!insertmacro MUI_UNPAGE_INSTFILES

!insertmacro MUI_LANGUAGE "English"

VIProductVersion "{{version_nsis}}"
VIAddVersionKey "ProductName" "{{name}}"
VIAddVersionKey "CompanyName" "{{publisher}}"
VIAddVersionKey "FileDescription" "{{description}}"
VIAddVersionKey "FileVersion" "{{version}}"
VIAddVersionKey "ProductVersion" "{{version}}"

Section "Install"
{{install_section}}SectionEnd

Section "Uninstall"
{{uninstall_section}}SectionEnd
"#;
