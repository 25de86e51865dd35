//! Command handlers

pub mod catalog;
pub mod config;
pub mod document;
pub mod status;

use anyhow::{Context, Result};
use tracing::warn;

use docshelf_core::{Catalog, Config, DocumentStore, Navigator, Renderer};

/// Open the store and wire it to a navigator as configured
///
/// An unreachable database is not an error here; the store degrades and
/// the catalog falls back to the seed file.
pub fn open_navigator(config: &Config) -> Result<Navigator<DocumentStore>> {
    let store = DocumentStore::open(config);
    let renderer = Renderer::from_config(config).context("Failed to load templates")?;

    Ok(Navigator::new(store, renderer).with_fallback(fallback_catalog(config)))
}

/// Catalog seed from `catalog_file`, or empty
pub fn fallback_catalog(config: &Config) -> Catalog {
    let Some(path) = &config.catalog_file else {
        return Catalog::new();
    };

    match Catalog::load_seed(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(path = %path.display(), error = %format!("{:#}", e), "Ignoring catalog seed");
            Catalog::new()
        }
    }
}
