//! NSIS utility functions.
//!
//! String escaping for NSIS quoted strings and the BOM-prefixed script writer.

use crate::bundler::{error::ErrorExt, error::Result, utils::fs::extend_long_path};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Escapes a value for embedding inside an NSIS double-quoted string.
///
/// Only double quotes are escaped (`"` becomes `$\"`).
pub fn escape(value: &str) -> String {
    value.replace('"', "$\\\"")
}

/// Quotes and escapes a value: `"value"`.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS requires installer scripts to be encoded with UTF-8 BOM (byte order mark).
/// This function writes the BOM (EF BB BF) followed by the content.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(extend_long_path(path))
        .await
        .fs_context("creating NSI script file", path)?;

    // Write UTF-8 BOM: EF BB BF
    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}
