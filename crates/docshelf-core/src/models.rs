//! Data models for docshelf
//!
//! Defines the core data structures: the (section, label) document key,
//! content types, the payload handed across the store boundary, and the
//! metadata view used for listings.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Missing input detected before anything is sent to the store
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Section name is required")]
    MissingSection,

    #[error("Label is required")]
    MissingLabel,

    #[error("A non-empty file is required")]
    MissingFile,
}

/// Natural key of a document: a label, unique within its section
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    section: String,
    label: String,
}

impl DocumentKey {
    /// Build a key, rejecting blank section or label
    ///
    /// Surrounding whitespace is trimmed.
    pub fn new(
        section: impl AsRef<str>,
        label: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let section = section.as_ref().trim();
        let label = label.as_ref().trim();

        if section.is_empty() {
            return Err(ValidationError::MissingSection);
        }
        if label.is_empty() {
            return Err(ValidationError::MissingLabel);
        }

        Ok(Self {
            section: section.to_string(),
            label: label.to_string(),
        })
    }

    /// Key for a row already in the database, skipping validation
    pub(crate) fn from_stored(section: &str, label: &str) -> Self {
        Self {
            section: section.to_string(),
            label: label.to_string(),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.section, self.label)
    }
}

/// Kind of binary content stored for a document
///
/// Determines how the payload crosses the store boundary and which
/// template renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Pdf,
    Video,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown content type '{0}'. Expected 'pdf' or 'video'.")]
pub struct UnknownContentType(pub String);

impl ContentType {
    /// Value stored in the `content_type` column
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Pdf => "pdf",
            ContentType::Video => "video",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ContentType::Pdf => "application/pdf",
            ContentType::Video => "video/mp4",
        }
    }

    /// Guess the content type from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(ContentType::Pdf),
            "mp4" | "m4v" | "webm" | "mov" => Some(ContentType::Video),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ContentType::Pdf),
            "video" => Ok(ContentType::Video),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// Document content as returned by the store
///
/// PDFs are handed out base64-encoded (text-safe), video as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Pdf { base64: String },
    Video { bytes: Vec<u8> },
}

impl Payload {
    /// Wrap raw stored bytes according to their content type
    pub fn from_content(content_type: ContentType, content: Vec<u8>) -> Self {
        match content_type {
            ContentType::Pdf => Payload::Pdf {
                base64: STANDARD.encode(&content),
            },
            ContentType::Video => Payload::Video { bytes: content },
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Payload::Pdf { .. } => ContentType::Pdf,
            Payload::Video { .. } => ContentType::Video,
        }
    }

    /// Base64 text of the content, encoding only when needed
    pub fn to_base64(&self) -> Cow<'_, str> {
        match self {
            Payload::Pdf { base64 } => Cow::Borrowed(base64),
            Payload::Video { bytes } => Cow::Owned(STANDARD.encode(bytes)),
        }
    }

    /// Raw content bytes, decoding the PDF variant
    pub fn into_bytes(self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            Payload::Pdf { base64 } => STANDARD.decode(base64),
            Payload::Video { bytes } => Ok(bytes),
        }
    }
}

/// Document metadata without its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub section: String,
    pub label: String,
    pub content_type: ContentType,
    /// Size of the stored content in bytes
    pub size: u64,
    /// Insertion order
    pub ordinal: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
