//! Status command handler

use anyhow::Result;

use docshelf_core::{Config, DocumentRepository, DocumentStore};

use crate::output::{human_size, Output, OutputFormat};

/// Show store health, counts and paths
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let store = DocumentStore::open(config);
    let db_path = config.sqlite_path();
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let documents = store.count().unwrap_or(0);
    let sections = store
        .list_catalog()
        .map(|c| c.sections().len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "available": store.is_available(),
                    "error": store.open_error(),
                    "database_path": db_path,
                    "database_size": db_size,
                    "counts": {
                        "documents": documents,
                        "sections": sections
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!(
                "{}",
                if store.is_available() {
                    "available"
                } else {
                    "unavailable"
                }
            );
        }
        OutputFormat::Human => {
            println!("docshelf Status");
            println!("===============");
            println!();
            println!("Store:");
            match store.open_error() {
                None => println!("  Status: available"),
                Some(reason) => {
                    println!("  Status: unavailable");
                    println!("  Error:  {}", reason);
                }
            }
            println!("  Location: {}", db_path.display());
            println!("  Size:     {}", human_size(db_size));
            println!();
            println!("Contents:");
            println!("  Sections:  {}", sections);
            println!("  Documents: {}", documents);
        }
    }

    Ok(())
}
