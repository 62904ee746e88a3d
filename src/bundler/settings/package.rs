//! Product identity: version and upgrade GUID parsing.

use crate::bundler::error::{Error, Result};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Largest value of each version part: MSI caps major and minor at 255 and
/// build at 65535; NSIS stores every part as a 16-bit word.
const PART_LIMITS: [u32; 4] = [255, 255, 65535, 65535];

/// Installer product version.
///
/// Two to four dot-separated numeric parts, e.g. "1.2", "1.2.3", "1.2.3.4".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProductVersion {
    parts: Vec<u32>,
}

impl ProductVersion {
    /// Parses a version string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for empty parts, non-numeric parts, a
    /// part count outside 2..=4, or a part above its installer limit
    /// (255.255.65535.65535).
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || {
            Error::InvalidConfiguration(format!(
                "version '{version}' must be 2 to 4 dot-separated numbers"
            ))
        };

        let parts = version
            .trim()
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        if !(2..=4).contains(&parts.len()) {
            return Err(invalid());
        }
        if let Some((part, limit)) = parts
            .iter()
            .zip(PART_LIMITS)
            .find(|(part, limit)| **part > *limit)
        {
            return Err(Error::InvalidConfiguration(format!(
                "version '{version}': part {part} exceeds the installer limit of {limit}"
            )));
        }

        Ok(Self { parts })
    }

    /// Version with exactly four parts (NSIS `VIProductVersion`).
    ///
    /// - "1.2" -> "1.2.0.0"
    /// - "1.2.3" -> "1.2.3.0"
    /// - "1.2.3.4" -> "1.2.3.4"
    pub fn four_part(&self) -> String {
        let mut parts = self.parts.clone();
        parts.resize(4, 0);
        join(&parts)
    }
}

impl FromStr for ProductVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.parts))
    }
}

fn join(parts: &[u32]) -> String {
    parts
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Parses a product GUID in plain or braced form.
pub fn parse_product_guid(guid: &str) -> Result<Uuid> {
    Uuid::parse_str(guid.trim())
        .map_err(|e| Error::InvalidConfiguration(format!("product GUID '{guid}' is invalid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_four_parts() {
        assert_eq!(ProductVersion::parse("1.2").unwrap().four_part(), "1.2.0.0");
        assert_eq!(ProductVersion::parse("1.2.3").unwrap().four_part(), "1.2.3.0");
        assert_eq!(ProductVersion::parse("1.2.3.4").unwrap().four_part(), "1.2.3.4");
    }

    #[test]
    fn display_keeps_original_part_count() {
        assert_eq!(ProductVersion::parse("1.2.3").unwrap().to_string(), "1.2.3");
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in [
            "",
            "1",
            "1.2.3.4.5",
            "1.x",
            "1..2",
            "v1.2",
            "256.0",
            "1.256",
            "1.2.70000",
            "1.2.3.65536",
        ] {
            assert!(ProductVersion::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn accepts_versions_at_the_installer_limits() {
        let max = ProductVersion::parse("255.255.65535.65535").unwrap();
        assert_eq!(max.to_string(), "255.255.65535.65535");
    }

    #[test]
    fn accepts_braced_and_plain_guids() {
        let braced = parse_product_guid("{11111111-1111-1111-1111-111111111111}").unwrap();
        let plain = parse_product_guid("11111111-1111-1111-1111-111111111111").unwrap();
        assert_eq!(braced, plain);
        assert!(parse_product_guid("not-a-guid").is_err());
    }
}
