//! Text extraction: Document → Paragraph Sequence → Normalized Content.
//!
//! ## Why spawn_blocking?
//!
//! Both decoders are CPU-bound and synchronous: `pdf-extract` walks the full
//! content-stream graph and the docx path inflates and parses an XML part.
//! `tokio::task::spawn_blocking` keeps that work off the async worker
//! threads so a large manuscript cannot stall concurrent requests.
//!
//! Extraction is a pure function of the input bytes: no temp files, no
//! process-wide state, and failures are deterministic — a corrupt document
//! fails the same way every time, so nothing here is ever retried.

use crate::document::{Document, MediaType};
use crate::error::ReviewError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Appended when the content cap truncates the evaluation context, so
/// callers can tell the review was based on partial text.
pub const TRUNCATION_MARKER: &str = "\n[Text truncated for processing]";

/// The Paragraph Sequence joined into a single evaluation-context blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContent {
    pub text: String,
    /// True when the cap was exceeded and [`TRUNCATION_MARKER`] appended.
    pub truncated: bool,
}

/// Extract the ordered, non-empty Paragraph Sequence from a document.
///
/// Dispatch is an exhaustive match on the media type: PDFs are decoded
/// page-by-page with each page split on line breaks, Word documents are
/// walked paragraph-element by paragraph-element in document order.
/// Fragments that are empty after trimming are dropped; order is extraction
/// order.
pub async fn extract(document: &Document) -> Result<Vec<String>, ReviewError> {
    let filename = document.filename.clone();
    let bytes = document.bytes.clone();

    let paragraphs = match document.media_type {
        MediaType::Pdf => {
            tokio::task::spawn_blocking(move || extract_pdf(&filename, &bytes))
                .await
                .map_err(|e| ReviewError::Internal(format!("extract task panicked: {e}")))??
        }
        MediaType::Word => {
            tokio::task::spawn_blocking(move || extract_docx(&filename, &bytes))
                .await
                .map_err(|e| ReviewError::Internal(format!("extract task panicked: {e}")))??
        }
    };

    debug!(
        filename = %document.filename,
        paragraphs = paragraphs.len(),
        "extracted paragraph sequence"
    );
    Ok(paragraphs)
}

/// PDF path: decode the whole document, split pages on the form-feed
/// characters `pdf-extract` inserts between them, then split each page's
/// text on line breaks into candidate fragments.
pub fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<Vec<String>, ReviewError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ReviewError::Extraction {
            filename: filename.to_string(),
            detail: e.to_string(),
        })?;

    let paragraphs: Vec<String> = text
        .split('\x0C')
        .flat_map(|page| page.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Ok(paragraphs)
}

/// Word path: open the zip container, stream `word/document.xml`, and
/// accumulate `w:t` text runs per `w:p` element in document order.
pub fn extract_docx(filename: &str, bytes: &[u8]) -> Result<Vec<String>, ReviewError> {
    let extraction_err = |detail: String| ReviewError::Extraction {
        filename: filename.to_string(),
        detail,
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| extraction_err(format!("invalid docx zip structure: {e}")))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| extraction_err(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut document_xml)
        .map_err(|e| extraction_err(format!("unreadable word/document.xml: {e}")))?;

    let mut reader = Reader::from_reader(Cursor::new(document_xml.into_bytes()));
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"p" => {
                current.clear();
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"p" => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    paragraphs.push(trimmed.to_string());
                }
                current.clear();
            }
            Ok(Event::Text(event)) => {
                let decoded = event
                    .unescape()
                    .map_err(|e| extraction_err(format!("bad text node: {e}")))?;
                current.push_str(&decoded);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(extraction_err(format!("malformed document.xml: {e}"))),
        }
        buf.clear();
    }

    Ok(paragraphs)
}

/// Join a Paragraph Sequence into the Normalized Content used as the
/// evaluation context for every LLM call, applying the configured character
/// cap.
pub fn normalize(paragraphs: &[String], cap: usize) -> NormalizedContent {
    let joined = paragraphs.join("\n\n");
    if joined.chars().count() <= cap {
        return NormalizedContent {
            text: joined,
            truncated: false,
        };
    }

    // Truncate on a char boundary, then append the visible marker.
    let mut text: String = joined.chars().take(cap).collect();
    text.push_str(TRUNCATION_MARKER);
    NormalizedContent {
        text,
        truncated: true,
    }
}

/// The manuscript title for the `{title}` template slot: the first
/// paragraph, by the usual convention that the title is the first line of
/// the document.
pub fn extract_title(paragraphs: &[String]) -> Option<&str> {
    paragraphs.first().map(String::as_str)
}
