//! Document store
//!
//! `DocumentStore` is the only component that touches the database. It owns
//! a single SQLite connection and exposes create/read/replace/delete on the
//! `documents` table plus the content-free catalog listing.
//!
//! ## Failure semantics
//!
//! Every database error is caught here, logged, and returned as a
//! [`StoreError`]. A store whose database could not be opened is still
//! constructed; it answers every operation with `StoreError::Unavailable`,
//! so callers check [`DocumentStore::is_available`] before relying on the
//! catalog.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = DocumentStore::open(&config);
//! let key = DocumentKey::new("SQL", "Tables")?;
//! store.create(&key, &bytes, ContentType::Pdf)?;
//! let payload = store.read(&key)?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::{ContentType, DocumentInfo, DocumentKey, Payload};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{StoreError, StoreResult};

/// The persistence operations the navigation layer depends on
pub trait DocumentRepository {
    /// Insert a new document; fails if the key already exists
    fn create(
        &mut self,
        key: &DocumentKey,
        content: &[u8],
        content_type: ContentType,
    ) -> StoreResult<()>;

    /// Replace the content of an existing document
    ///
    /// When `content_type` is `None` the stored type is kept.
    fn replace(
        &mut self,
        key: &DocumentKey,
        content: &[u8],
        content_type: Option<ContentType>,
    ) -> StoreResult<()>;

    /// Remove a document
    fn delete(&mut self, key: &DocumentKey) -> StoreResult<()>;

    /// Fetch a document's payload, `None` when the key is unknown
    fn read(&self, key: &DocumentKey) -> StoreResult<Option<Payload>>;

    /// Sections and labels in insertion order
    fn list_catalog(&self) -> StoreResult<Catalog>;
}

/// SQLite-backed document store
pub struct DocumentStore {
    conn: Option<Connection>,
    /// Why the connection is missing, for degraded stores
    open_error: Option<String>,
    path: Option<PathBuf>,
}

impl DocumentStore {
    /// Open the configured database
    ///
    /// Never fails: if the database cannot be opened the store is returned
    /// in degraded mode and the error is logged.
    pub fn open(config: &Config) -> Self {
        Self::open_path(
            &config.sqlite_path(),
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Open a database file, degrading on failure
    pub fn open_path(path: &Path, busy_timeout: Duration) -> Self {
        match connect(path, busy_timeout) {
            Ok(conn) => {
                info!(path = %path.display(), "Opened document database");
                Self {
                    conn: Some(conn),
                    open_error: None,
                    path: Some(path.to_path_buf()),
                }
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(path = %path.display(), error = %reason, "Document database unavailable");
                Self {
                    conn: None,
                    open_error: Some(reason),
                    path: Some(path.to_path_buf()),
                }
            }
        }
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Some(conn),
            open_error: None,
            path: None,
        })
    }

    /// Build a store that rejects every operation
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            conn: None,
            open_error: Some(reason.into()),
            path: None,
        }
    }

    /// Whether the database connection was established
    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    /// Reason the store is degraded, if it is
    pub fn open_error(&self) -> Option<&str> {
        self.open_error.as_deref()
    }

    /// Database file backing this store (`None` for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ==================== Metadata ====================

    /// Metadata for one document, without its content
    pub fn info(&self, key: &DocumentKey) -> StoreResult<Option<DocumentInfo>> {
        let result = self.connection().and_then(|conn| {
            conn.query_row(
                r#"
                SELECT section_name, button_name, content_type, length(content),
                       ordinal, created_at, updated_at
                FROM documents
                WHERE section_name = ?1 AND button_name = ?2
                "#,
                params![key.section(), key.label()],
                info_from_row,
            )
            .optional()
            .map_err(StoreError::from)
            .and_then(|row| row.map(|r| r.into_info()).transpose())
        });
        logged("info", Some(key), result)
    }

    /// Metadata for every document, in insertion order
    pub fn list_documents(&self) -> StoreResult<Vec<DocumentInfo>> {
        let result = self.connection().and_then(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT section_name, button_name, content_type, length(content),
                       ordinal, created_at, updated_at
                FROM documents
                ORDER BY ordinal ASC
                "#,
            )?;
            let rows = stmt
                .query_map([], info_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(InfoRow::into_info).collect()
        });
        logged("list_documents", None, result)
    }

    /// Number of stored documents
    pub fn count(&self) -> StoreResult<i64> {
        let result = self.connection().and_then(|conn| {
            conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
                .map_err(StoreError::from)
        });
        logged("count", None, result)
    }

    // ==================== Private helpers ====================

    fn connection(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or_else(|| self.unavailable_error())
    }

    fn connection_mut(&mut self) -> StoreResult<&mut Connection> {
        let err = self.unavailable_error();
        self.conn.as_mut().ok_or(err)
    }

    fn unavailable_error(&self) -> StoreError {
        StoreError::Unavailable {
            reason: self
                .open_error
                .clone()
                .unwrap_or_else(|| "no connection".to_string()),
        }
    }
}

impl DocumentRepository for DocumentStore {
    fn create(
        &mut self,
        key: &DocumentKey,
        content: &[u8],
        content_type: ContentType,
    ) -> StoreResult<()> {
        let result = self.connection_mut().and_then(|conn| {
            let now = Utc::now().timestamp_millis();
            let mut write = || -> rusqlite::Result<()> {
                let tx = conn.transaction()?;
                tx.execute(
                    r#"
                    INSERT INTO documents
                        (section_name, button_name, content, content_type, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    "#,
                    params![key.section(), key.label(), content, content_type.as_str(), now],
                )?;
                tx.commit()
            };
            // Dropping an uncommitted transaction rolls it back
            write().map_err(|e| StoreError::from_write(e, key))
        });
        logged("create", Some(key), result)
    }

    fn replace(
        &mut self,
        key: &DocumentKey,
        content: &[u8],
        content_type: Option<ContentType>,
    ) -> StoreResult<()> {
        let result = self.connection_mut().and_then(|conn| {
            let now = Utc::now().timestamp_millis();
            let mut write = || -> rusqlite::Result<usize> {
                let tx = conn.transaction()?;
                let affected = tx.execute(
                    r#"
                    UPDATE documents
                    SET content = ?1,
                        content_type = COALESCE(?2, content_type),
                        updated_at = ?3
                    WHERE section_name = ?4 AND button_name = ?5
                    "#,
                    params![
                        content,
                        content_type.map(ContentType::as_str),
                        now,
                        key.section(),
                        key.label()
                    ],
                )?;
                tx.commit()?;
                Ok(affected)
            };
            match write().map_err(|e| StoreError::from_write(e, key))? {
                0 => Err(StoreError::NotFound { key: key.clone() }),
                _ => Ok(()),
            }
        });
        logged("replace", Some(key), result)
    }

    fn delete(&mut self, key: &DocumentKey) -> StoreResult<()> {
        let result = self.connection_mut().and_then(|conn| {
            let mut write = || -> rusqlite::Result<usize> {
                let tx = conn.transaction()?;
                let affected = tx.execute(
                    "DELETE FROM documents WHERE section_name = ?1 AND button_name = ?2",
                    params![key.section(), key.label()],
                )?;
                tx.commit()?;
                Ok(affected)
            };
            match write().map_err(|e| StoreError::from_write(e, key))? {
                0 => Err(StoreError::NotFound { key: key.clone() }),
                _ => Ok(()),
            }
        });
        logged("delete", Some(key), result)
    }

    fn read(&self, key: &DocumentKey) -> StoreResult<Option<Payload>> {
        let result = self.connection().and_then(|conn| {
            let row: Option<(Vec<u8>, String)> = conn
                .query_row(
                    "SELECT content, content_type FROM documents WHERE section_name = ?1 AND button_name = ?2",
                    params![key.section(), key.label()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            row.map(|(content, content_type)| -> StoreResult<Payload> {
                let content_type = content_type.parse::<ContentType>().map_err(|e| {
                    StoreError::Corrupt {
                        key: key.clone(),
                        details: e.to_string(),
                    }
                })?;
                Ok(Payload::from_content(content_type, content))
            })
            .transpose()
        });
        logged("read", Some(key), result)
    }

    fn list_catalog(&self) -> StoreResult<Catalog> {
        let result = self.connection().and_then(|conn| {
            let mut stmt = conn.prepare(
                "SELECT section_name, button_name FROM documents ORDER BY ordinal ASC",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            let mut catalog = Catalog::new();
            for (section, label) in &rows {
                catalog.push(section, label);
            }
            Ok(catalog)
        });
        logged("list_catalog", None, result)
    }
}

// ==================== Internal helpers ====================

fn connect(path: &Path, busy_timeout: Duration) -> anyhow::Result<Connection> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open SQLite database at {:?}", path))?;
    conn.busy_timeout(busy_timeout)?;

    if needs_init(&conn) {
        init_schema(&conn).context("Failed to initialize SQLite schema")?;
    }

    Ok(conn)
}

/// Log failures at the store boundary before handing them back
fn logged<T>(op: &str, key: Option<&DocumentKey>, result: StoreResult<T>) -> StoreResult<T> {
    match &result {
        Ok(_) => debug!(op, key = ?key.map(ToString::to_string), "Store operation succeeded"),
        Err(e) if e.is_not_found() => {
            info!(op, key = ?key.map(ToString::to_string), "Document not found")
        }
        Err(e) => warn!(op, key = ?key.map(ToString::to_string), error = %e, "Store operation failed"),
    }
    result
}

struct InfoRow {
    section: String,
    label: String,
    content_type: String,
    size: i64,
    ordinal: i64,
    created_at: i64,
    updated_at: i64,
}

fn info_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<InfoRow> {
    Ok(InfoRow {
        section: row.get(0)?,
        label: row.get(1)?,
        content_type: row.get(2)?,
        size: row.get(3)?,
        ordinal: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl InfoRow {
    fn into_info(self) -> StoreResult<DocumentInfo> {
        let corrupt = |details: String| StoreError::Corrupt {
            key: DocumentKey::from_stored(&self.section, &self.label),
            details,
        };

        let content_type = self
            .content_type
            .parse::<ContentType>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(DocumentInfo {
            content_type,
            size: u64::try_from(self.size).unwrap_or(0),
            ordinal: self.ordinal,
            created_at: timestamp(self.created_at),
            updated_at: timestamp(self.updated_at),
            section: self.section,
            label: self.label,
        })
    }
}

fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}
