//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use docshelf_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, database_path, busy_timeout_ms, template_dir, stylesheet, catalog_file, title, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database_path": config.sqlite_path(),
                    "busy_timeout_ms": config.busy_timeout_ms,
                    "template_dir": config.template_dir,
                    "stylesheet": config.stylesheet,
                    "catalog_file": config.catalog_file,
                    "title": config.title,
                    "log_file": config.log_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.sqlite_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:        {}", config.data_dir.display());
            println!("  database_path:   {}", config.sqlite_path().display());
            println!("  busy_timeout_ms: {}", config.busy_timeout_ms);
            println!(
                "  template_dir:    {}",
                display_or(config.template_dir.as_deref(), "(built-in)")
            );
            println!(
                "  stylesheet:      {}",
                display_or(config.stylesheet.as_deref(), "(built-in)")
            );
            println!(
                "  catalog_file:    {}",
                display_or(config.catalog_file.as_deref(), "(not set)")
            );
            println!("  title:           {}", config.title);
            println!("  log_file:        {}", config.log_path().display());
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.is_empty() {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "database_path" => config.database_path = optional_path(value),
        "busy_timeout_ms" => {
            config.busy_timeout_ms = value
                .parse()
                .context("Invalid value for busy_timeout_ms. Use a number of milliseconds.")?;
        }
        "template_dir" => config.template_dir = optional_path(value),
        "stylesheet" => config.stylesheet = optional_path(value),
        "catalog_file" => config.catalog_file = optional_path(value),
        "title" => config.title = value.to_string(),
        "log_file" => config.log_file = optional_path(value),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional path
fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_or(path: Option<&Path>, fallback: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}
