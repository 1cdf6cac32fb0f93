//! Document model: raw bytes plus a declared media type and a filename.
//!
//! The media type is a tagged variant rather than a string so that
//! extraction dispatch is checked exhaustively at compile time. Anything
//! that is neither PDF nor Word is rejected at the ingress boundary, before
//! a [`Document`] can even be constructed.

use crate::error::ReviewError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two supported manuscript formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    /// `application/pdf`
    Pdf,
    /// `application/vnd.openxmlformats-officedocument.wordprocessingml.document`
    Word,
}

impl MediaType {
    /// Parse a declared MIME type. Fails with [`ReviewError::UnsupportedFormat`]
    /// for everything outside the two supported types.
    pub fn from_mime(mime: &str) -> Result<Self, ReviewError> {
        match mime {
            "application/pdf" => Ok(MediaType::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(MediaType::Word)
            }
            other => Err(ReviewError::UnsupportedFormat {
                media_type: other.to_string(),
            }),
        }
    }

    /// Sniff the media type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Result<Self, ReviewError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(MediaType::Pdf),
            "docx" | "doc" => Ok(MediaType::Word),
            other => Err(ReviewError::UnsupportedFormat {
                media_type: format!(".{other}"),
            }),
        }
    }

    /// The canonical MIME string for this type.
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// An uploaded manuscript: opaque bytes, a declared media type, and the
/// filename that serves as its cache identity. Immutable once received.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            bytes,
        }
    }

    /// Construct a PDF document, validating the `%PDF` magic bytes.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ReviewError> {
        let filename = filename.into();
        if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(4);
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(ReviewError::NotAPdf { filename, magic });
        }
        Ok(Self::new(filename, MediaType::Pdf, bytes))
    }

    /// Construct a Word document. No magic check: docx is a zip container
    /// and structural validation happens at extraction time.
    pub fn word(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, MediaType::Word, bytes)
    }
}
