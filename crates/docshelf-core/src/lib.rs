//! docshelf Core Library
//!
//! This crate provides the core functionality for docshelf, a browser for
//! PDF and video documents organized as labels within sections.
//!
//! # Architecture
//!
//! - **DocumentStore**: SQLite table keyed by (section, label), sole owner
//!   of persistence
//! - **Navigator**: state machine moving a `Session` between browsing and
//!   the upload/edit/delete forms
//! - **Renderer**: fills HTML templates with document payloads
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = DocumentStore::open(&config);
//! let mut nav = Navigator::new(store, Renderer::from_config(&config)?);
//!
//! let mut session = Session::new();
//! nav.apply(&mut session, Action::select("SQL", "Tables"))?;
//! ```
//!
//! # Modules
//!
//! - `store`: Document store and the `DocumentRepository` trait
//! - `navigation`: Modes, actions and the navigator
//! - `render`: Template loading and rendering
//! - `cache`: Read-through payload cache
//! - `catalog`: Section/label listing and the fallback seed file
//! - `models`: Keys, content types and payloads
//! - `storage`: SQLite schema and store errors
//! - `config`: Application configuration

pub mod cache;
pub mod catalog;
pub mod config;
pub mod models;
pub mod navigation;
pub mod render;
pub mod storage;
pub mod store;

pub use cache::{DocumentCache, MemoryCache, NoCache};
pub use catalog::{Catalog, CatalogSection};
pub use config::Config;
pub use models::{ContentType, DocumentInfo, DocumentKey, Payload, ValidationError};
pub use navigation::{Action, DocumentForm, Mode, Navigator, Notice, Outcome, Session, View};
pub use render::{RenderContext, RenderError, Renderer};
pub use storage::{StoreError, StoreResult};
pub use store::{DocumentRepository, DocumentStore};
