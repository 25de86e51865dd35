//! Navigation catalog
//!
//! The catalog is the content-free listing of sections and their labels
//! used to build menus. Sections appear in the order their first document
//! was inserted; labels keep insertion order within a section.
//!
//! A catalog can also be seeded from a TOML file, which is what the menu
//! falls back to when the database cannot be reached:
//!
//! ```toml
//! [[section]]
//! name = "SQL"
//! labels = ["Tables", "Joins"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::DocumentKey;

/// One collapsible menu group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Ordered section -> labels listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "section", alias = "sections", default)]
    sections: Vec<CatalogSection>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label, creating its section on first use
    ///
    /// Blank names and repeated labels are ignored.
    pub fn push(&mut self, section: &str, label: &str) {
        if section.trim().is_empty() || label.trim().is_empty() {
            return;
        }

        let idx = match self.sections.iter().position(|s| s.name == section) {
            Some(idx) => idx,
            None => {
                self.sections.push(CatalogSection {
                    name: section.to_string(),
                    labels: Vec::new(),
                });
                self.sections.len() - 1
            }
        };

        let labels = &mut self.sections[idx].labels;
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    pub fn sections(&self) -> &[CatalogSection] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&CatalogSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.section(key.section())
            .map(|s| s.labels.iter().any(|l| l == key.label()))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of documents listed
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.labels.len()).sum()
    }

    /// All (section, label) pairs in menu order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().flat_map(|s| {
            s.labels
                .iter()
                .map(move |label| (s.name.as_str(), label.as_str()))
        })
    }

    /// Parse a seed catalog from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: Catalog = toml::from_str(content).context("Failed to parse catalog TOML")?;

        // Re-insert so blanks and duplicates in hand-written files are dropped
        let mut catalog = Catalog::new();
        for section in &raw.sections {
            for label in &section.labels {
                catalog.push(section.name.trim(), label.trim());
            }
        }
        Ok(catalog)
    }

    /// Load a seed catalog file
    pub fn load_seed(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid catalog file: {:?}", path))
    }
}
