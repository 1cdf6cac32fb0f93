//! Input resolution: normalise a user-supplied path or URL to a
//! [`Document`].
//!
//! The ingress operations take an already-received document; this module is
//! for callers (primarily the CLI) that start from a path or URL instead.
//! The media type is sniffed from the file extension, PDFs get a magic-byte
//! check so a mislabeled file produces a meaningful error rather than a
//! decoder failure deep in the pipeline.

use crate::document::{Document, MediaType};
use crate::error::ReviewError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a [`Document`].
///
/// If the input is a URL, download it (bounded by `timeout_secs`).
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Document, ReviewError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input).await
    }
}

fn media_type_of(path: &Path) -> Result<MediaType, ReviewError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ReviewError::InvalidInput {
            input: path.display().to_string(),
        })?;
    MediaType::from_extension(ext)
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Resolve a local file path, validating existence, readability and (for
/// PDFs) the `%PDF` magic bytes.
async fn resolve_local(path_str: &str) -> Result<Document, ReviewError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ReviewError::FileNotFound { path });
    }

    let media_type = media_type_of(&path)?;
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ReviewError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ReviewError::FileNotFound { path });
        }
    };

    debug!(path = %path.display(), media_type = %media_type, "resolved local document");
    let filename = filename_of(&path);
    match media_type {
        MediaType::Pdf => Document::pdf(filename, bytes),
        MediaType::Word => Ok(Document::word(filename, bytes)),
    }
}

/// Download a URL into an in-memory [`Document`].
async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, ReviewError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ReviewError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ReviewError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ReviewError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ReviewError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    // Prefer the Content-Type header; fall back to the URL path extension.
    let header_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let filename = extract_filename(url);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReviewError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    let media_type = match header_type.as_deref() {
        Some(mime) if MediaType::from_mime(mime).is_ok() => MediaType::from_mime(mime)?,
        // Servers frequently send application/octet-stream; sniff from the
        // URL path and finally from the payload itself.
        _ => media_type_of(Path::new(&filename)).or_else(|_| {
            if bytes.starts_with(b"%PDF") {
                Ok(MediaType::Pdf)
            } else {
                Err(ReviewError::InvalidInput {
                    input: url.to_string(),
                })
            }
        })?,
    };

    info!(bytes = bytes.len(), media_type = %media_type, "download complete");
    match media_type {
        MediaType::Pdf => Document::pdf(filename, bytes),
        MediaType::Word => Ok(Document::word(filename, bytes)),
    }
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url_path() {
        assert_eq!(
            extract_filename("https://example.com/papers/study.docx"),
            "study.docx"
        );
        assert_eq!(extract_filename("https://example.com/"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = resolve_input("/definitely/not/a/real/file.pdf", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, ReviewError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn mislabeled_pdf_rejected_by_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, "not a pdf at all").unwrap();

        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn local_pdf_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.4\nbody").unwrap();

        let doc = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(doc.filename, "ok.pdf");
        assert_eq!(doc.media_type, MediaType::Pdf);
    }
}
