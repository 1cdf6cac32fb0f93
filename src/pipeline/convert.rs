//! Word-to-PDF conversion via an external converter subprocess.
//!
//! ## Temp-file discipline
//!
//! The converter only speaks filesystem paths, so the input bytes are
//! written to a [`tempfile::NamedTempFile`] and the produced PDF is read
//! back from a sibling path registered as a [`tempfile::TempPath`]. Both
//! handles delete their file on drop, which covers every exit path —
//! success, converter failure, timeout, and read failure — without any
//! explicit cleanup code.
//!
//! A non-zero converter exit is fatal for the request and never retried:
//! external tool failures are typically deterministic for a given malformed
//! input, so a retry would only repeat the same diagnostic.

use crate::config::ReviewConfig;
use crate::error::ReviewError;
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tempfile::{NamedTempFile, TempPath};
use tokio::process::Command;
use tracing::{debug, info};

/// Convert Word document bytes into a PDF byte stream.
///
/// Invokes `<converter> -f pdf -o <output> <input>`, waits for completion
/// (bounded by `config.converter_timeout_secs`), and reads the produced
/// file fully into memory. The returned bytes are validated to start with
/// the `%PDF` header.
pub async fn to_pdf(word_bytes: &[u8], config: &ReviewConfig) -> Result<Vec<u8>, ReviewError> {
    // Input temp file; deleted when `input` drops.
    let mut input = NamedTempFile::with_suffix(".docx")
        .map_err(|e| ReviewError::Internal(format!("tempfile: {e}")))?;
    input
        .write_all(word_bytes)
        .map_err(|e| ReviewError::Internal(format!("tempfile write: {e}")))?;
    input
        .flush()
        .map_err(|e| ReviewError::Internal(format!("tempfile flush: {e}")))?;

    let input_path = input.path().to_path_buf();
    let output_path = input_path.with_extension("docx.pdf");
    // Owning TempPath guarantees deletion of the output even if the read
    // below fails; the converter may or may not have created the file yet.
    let output_guard = TempPath::from_path(&output_path);

    debug!(
        converter = %config.converter_program,
        input = %input_path.display(),
        output = %output_path.display(),
        "starting word-to-pdf conversion"
    );

    let child = Command::new(&config.converter_program)
        .arg("-f")
        .arg("pdf")
        .arg("-o")
        .arg(&output_path)
        .arg(&input_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    let output = match tokio::time::timeout(
        Duration::from_secs(config.converter_timeout_secs),
        child,
    )
    .await
    {
        Err(_) => {
            return Err(ReviewError::ConverterTimeout {
                secs: config.converter_timeout_secs,
            })
        }
        Ok(Err(e)) => {
            return Err(ReviewError::ConverterLaunch {
                program: config.converter_program.clone(),
                source: e,
            })
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ReviewError::Conversion {
            status: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    let pdf_bytes = tokio::fs::read(&output_path).await.map_err(|e| {
        ReviewError::Conversion {
            status: 0,
            stderr: format!("converter exited 0 but produced no readable PDF: {e}"),
        }
    })?;

    if pdf_bytes.len() < 4 || &pdf_bytes[..4] != b"%PDF" {
        return Err(ReviewError::Conversion {
            status: 0,
            stderr: "converter output does not start with a PDF header".into(),
        });
    }

    info!(bytes = pdf_bytes.len(), "word-to-pdf conversion succeeded");

    // Explicit close surfaces deletion errors instead of swallowing them in
    // drop; the files are gone before the bytes are returned.
    output_guard
        .close()
        .map_err(|e| ReviewError::Internal(format!("temp output cleanup: {e}")))?;
    input
        .close()
        .map_err(|e| ReviewError::Internal(format!("temp input cleanup: {e}")))?;

    Ok(pdf_bytes)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Write an executable fake converter script and return its path.
    ///
    /// The success variant ignores flags and copies a `%PDF` payload to the
    /// `-o` argument; the failure variant prints a diagnostic on stderr and
    /// exits 1, like a converter choking on malformed input.
    fn fake_converter(dir: &Path, script: &str) -> String {
        let path = dir.join("fake-convert");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config_with(converter: String) -> ReviewConfig {
        ReviewConfig::builder()
            .converter_program(converter)
            .converter_timeout_secs(10)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn success_produces_pdf_and_cleans_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths_log = dir.path().join("paths");
        // $4 is the -o argument, $5 the input path. Record both so the test
        // can verify they are gone after the call returns.
        let converter = fake_converter(
            dir.path(),
            &format!(
                r#"printf '%%s\n%%s\n' "$4" "$5" > "{}"; printf '%%PDF-1.4 fake body' > "$4""#,
                paths_log.display()
            ),
        );

        let pdf = to_pdf(b"word bytes", &config_with(converter)).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let recorded = std::fs::read_to_string(&paths_log).unwrap();
        for path in recorded.lines().filter(|l| !l.is_empty()) {
            assert!(
                !Path::new(path).exists(),
                "temp file survived conversion: {path}"
            );
        }
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr_and_cleans_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths_log = dir.path().join("paths");
        let converter = fake_converter(
            dir.path(),
            &format!(
                r#"printf '%%s\n%%s\n' "$4" "$5" > "{}"; echo 'unoconv: cannot load document' >&2; exit 3"#,
                paths_log.display()
            ),
        );

        let err = to_pdf(b"word bytes", &config_with(converter))
            .await
            .unwrap_err();
        match err {
            ReviewError::Conversion { status, stderr } => {
                assert_eq!(status, 3);
                assert!(stderr.contains("cannot load document"));
            }
            other => panic!("expected Conversion, got {other:?}"),
        }

        // Failure exits through the drop guards; both temp paths are gone.
        let recorded = std::fs::read_to_string(&paths_log).unwrap();
        for path in recorded.lines().filter(|l| !l.is_empty()) {
            assert!(
                !Path::new(path).exists(),
                "temp file survived failed conversion: {path}"
            );
        }
    }

    #[tokio::test]
    async fn missing_output_file_is_a_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let converter = fake_converter(dir.path(), "exit 0");

        let err = to_pdf(b"word bytes", &config_with(converter))
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Conversion { .. }));
    }

    #[tokio::test]
    async fn non_pdf_output_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let converter = fake_converter(dir.path(), r#"printf 'not a pdf' > "$4""#);

        let err = to_pdf(b"word bytes", &config_with(converter))
            .await
            .unwrap_err();
        match err {
            ReviewError::Conversion { stderr, .. } => {
                assert!(stderr.contains("PDF header"), "got: {stderr}")
            }
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_converter_fails_to_launch() {
        let config = config_with("/definitely/not/a/converter".into());
        let err = to_pdf(b"word bytes", &config).await.unwrap_err();
        assert!(matches!(err, ReviewError::ConverterLaunch { .. }));
    }

    #[tokio::test]
    async fn slow_converter_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let converter = fake_converter(dir.path(), "sleep 30");
        let config = ReviewConfig::builder()
            .converter_program(converter)
            .converter_timeout_secs(1)
            .build()
            .unwrap();

        let err = to_pdf(b"word bytes", &config).await.unwrap_err();
        assert!(matches!(err, ReviewError::ConverterTimeout { secs: 1 }));
    }
}
