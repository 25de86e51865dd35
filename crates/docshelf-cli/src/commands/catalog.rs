//! Catalog command handler

use anyhow::Result;

use docshelf_core::Config;

use super::open_navigator;
use crate::output::Output;

/// List sections and labels
pub fn list(config: &Config, output: &Output) -> Result<()> {
    let nav = open_navigator(config)?;

    if let Some(reason) = nav.repository().open_error() {
        output.warn(&format!(
            "Database unavailable ({}); showing fallback catalog",
            reason
        ));
    }

    output.print_catalog(&nav.catalog())
}
