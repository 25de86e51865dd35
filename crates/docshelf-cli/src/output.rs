//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use docshelf_core::{Catalog, DocumentInfo, DocumentKey};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print the section/label catalog
    pub fn print_catalog(&self, catalog: &Catalog) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if catalog.is_empty() {
                    println!("No documents found.");
                    return Ok(());
                }
                for section in catalog.sections() {
                    println!("{}", section.name);
                    for label in &section.labels {
                        println!("  {}", label);
                    }
                }
                println!(
                    "\n{} document(s) in {} section(s)",
                    catalog.len(),
                    catalog.sections().len()
                );
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(catalog.sections())?);
            }
            OutputFormat::Quiet => {
                for (section, label) in catalog.entries() {
                    println!("{}\t{}", section, label);
                }
            }
        }
        Ok(())
    }

    /// Print document metadata
    pub fn print_info(&self, info: &DocumentInfo) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Section:  {}", info.section);
                println!("Label:    {}", info.label);
                println!("Type:     {}", info.content_type);
                println!("Size:     {}", human_size(info.size));
                println!("Position: {}", info.ordinal);
                println!("Created:  {}", local_time(&info.created_at));
                println!("Updated:  {}", local_time(&info.updated_at));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(info)?);
            }
            OutputFormat::Quiet => {
                println!("{}", info.content_type);
            }
        }
        Ok(())
    }

    /// Print rendered markup for a document
    pub fn print_markup(&self, key: &DocumentKey, markup: &str) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "section": key.section(),
                        "label": key.label(),
                        "markup": markup
                    })
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", markup),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Timestamp in the local timezone, minute precision
fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format a byte count for display
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
