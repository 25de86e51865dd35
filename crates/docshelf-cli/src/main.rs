//! docshelf CLI
//!
//! Command-line interface and terminal browser for docshelf documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docshelf_core::{Config, ContentType};

mod browser;
mod commands;
mod output;
mod prompt;
mod tui;

use output::{Output, OutputFormat};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "DOCSHELF_LOG";

#[derive(Parser)]
#[command(name = "docshelf")]
#[command(about = "docshelf - Browse PDF and video documents by section")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List sections and labels
    #[command(alias = "ls")]
    List,
    /// Render a document
    Show {
        section: String,
        label: String,
        /// Use the compact inline template
        #[arg(long)]
        inline: bool,
        /// Open the rendered page in the browser
        #[arg(long)]
        open: bool,
    },
    /// Show document metadata
    Info { section: String, label: String },
    /// Upload a new document
    #[command(alias = "add")]
    Upload {
        section: String,
        label: String,
        /// File to upload
        file: PathBuf,
        /// Content type (pdf or video); guessed from the extension if omitted
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,
    },
    /// Replace an existing document's content
    #[command(alias = "edit")]
    Replace {
        section: String,
        label: String,
        /// New content
        file: PathBuf,
        /// Content type (pdf or video); kept as stored if omitted
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,
    },
    /// Delete a document
    #[command(alias = "rm")]
    Delete {
        section: String,
        label: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show store status
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, database_path, template_dir, ...)
        key: String,
        /// Configuration value ("none" clears optional keys)
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work on the file itself, before anything is opened
    if let Some(Commands::Config { command }) = &cli.command {
        init_logging();
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let Some(command) = cli.command else {
        return tui::run(config);
    };

    if !matches!(command, Commands::Tui) {
        init_logging();
    }

    match command {
        Commands::Tui => tui::run(config),
        Commands::List => commands::catalog::list(&config, &output),
        Commands::Show {
            section,
            label,
            inline,
            open,
        } => commands::document::show(&config, section, label, inline, open, &output),
        Commands::Info { section, label } => {
            commands::document::info(&config, section, label, &output)
        }
        Commands::Upload {
            section,
            label,
            file,
            content_type,
        } => commands::document::upload(&config, section, label, file, content_type, &output),
        Commands::Replace {
            section,
            label,
            file,
            content_type,
        } => commands::document::replace(&config, section, label, file, content_type, &output),
        Commands::Delete {
            section,
            label,
            yes,
        } => commands::document::delete(&config, section, label, yes, &output),
        Commands::Status => commands::status::show(&config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Initialize stderr logging for one-shot commands
///
/// Filter comes from DOCSHELF_LOG, defaulting to warnings only.
fn init_logging() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
