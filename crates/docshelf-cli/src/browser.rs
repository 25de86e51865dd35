//! Opening rendered documents in the system browser
//!
//! Pages are written to the temp directory and handed to the platform
//! opener. The file is left in place since the browser loads it after we
//! return.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use docshelf_core::DocumentKey;

/// Write a standalone page for `key` and open it
pub fn open_page(key: &DocumentKey, html: &str) -> Result<PathBuf> {
    let path = env::temp_dir().join(page_file_name(key));

    fs::write(&path, html)
        .with_context(|| format!("Failed to write page: {}", path.display()))?;

    open::that(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    debug!(path = %path.display(), "Opened page in browser");

    Ok(path)
}

/// File name safe on every platform, unique per key and process
fn page_file_name(key: &DocumentKey) -> String {
    let slug = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    };
    format!(
        "docshelf_{}_{}_{}.html",
        slug(key.section()),
        slug(key.label()),
        std::process::id()
    )
}
