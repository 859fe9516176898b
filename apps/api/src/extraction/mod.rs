#![allow(dead_code)]

//! Text Extractor — turns uploaded resume bytes into normalized plain text.
//!
//! - Format is resolved from the file extension first, then the MIME type.
//! - `extract_document` is the pure, synchronous entry point.
//! - `extract_with_deadline` runs it on the blocking pool under a timeout so a
//!   pathological file can never hang an upload batch.

pub mod contact;
mod formats;

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::extraction::contact::{extract_contact, ContactInfo};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Extraction failed: {reason}")]
    ExtractionFailed { reason: String },
}

impl ExtractionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ExtractionError::ExtractionFailed {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in per-file failure reports.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ExtractionError::ExtractionFailed { .. } => "EXTRACTION_FAILED",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inputs / outputs
// ────────────────────────────────────────────────────────────────────────────

/// A resume file as received from the uploader.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Result of extracting one document: normalized text plus best-effort contact details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

/// Outcome of looking at a filename / MIME pair.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolved {
    Known(DocumentFormat),
    Unsupported(String),
    Unknown,
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown", "csv", "log", "rst"];

const UNSUPPORTED_EXTENSIONS: &[&str] = &[
    "doc", "rtf", "odt", "pages", "png", "jpg", "jpeg", "gif", "bmp", "tiff", "zip", "gz", "tar",
    "7z", "rar", "exe", "bin",
];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn resolve_format(filename: &str, content_type: Option<&str>) -> Resolved {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = extension.as_deref() {
        match ext {
            "pdf" => return Resolved::Known(DocumentFormat::Pdf),
            "docx" => return Resolved::Known(DocumentFormat::Docx),
            e if TEXT_EXTENSIONS.contains(&e) => return Resolved::Known(DocumentFormat::PlainText),
            e if UNSUPPORTED_EXTENSIONS.contains(&e) => {
                return Resolved::Unsupported(format!(".{e}"))
            }
            _ => {}
        }
    }

    let mime = content_type
        .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");

    match mime.as_deref() {
        Some("application/pdf") => Resolved::Known(DocumentFormat::Pdf),
        Some(DOCX_MIME) => Resolved::Known(DocumentFormat::Docx),
        Some(m) if m.starts_with("text/") => Resolved::Known(DocumentFormat::PlainText),
        Some(m) => Resolved::Unsupported(m.to_string()),
        None => Resolved::Unknown,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts the raw (un-normalized) text of a document.
pub fn extract_raw_text(
    data: &[u8],
    filename: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractionError> {
    match resolve_format(filename, content_type) {
        Resolved::Known(DocumentFormat::Pdf) => formats::pdf_text(data),
        Resolved::Known(DocumentFormat::Docx) => formats::docx_text(data),
        Resolved::Known(DocumentFormat::PlainText) => formats::plain_text(data),
        Resolved::Unsupported(format) => Err(ExtractionError::UnsupportedFormat { format }),
        // Best effort for unknown types, but only if the bytes really are text.
        Resolved::Unknown => match std::str::from_utf8(data) {
            Ok(text) if !text.contains('\0') => Ok(text.trim_start_matches('\u{feff}').to_string()),
            _ => Err(ExtractionError::UnsupportedFormat {
                format: if filename.is_empty() {
                    "unknown".to_string()
                } else {
                    filename.to_string()
                },
            }),
        },
    }
}

/// Extracts normalized text (lowercase, whitespace collapsed) from raw document bytes.
pub fn extract_text(
    data: &[u8],
    filename: &str,
    content_type: Option<&str>,
) -> Result<String, ExtractionError> {
    extract_raw_text(data, filename, content_type).map(|raw| normalize(&raw))
}

/// Extracts normalized text and contact details from an uploaded file.
pub fn extract_document(file: &UploadedFile) -> Result<ExtractedDocument, ExtractionError> {
    let raw = extract_raw_text(&file.data, &file.filename, file.content_type.as_deref())?;
    Ok(ExtractedDocument {
        contact: extract_contact(&raw),
        text: normalize(&raw),
    })
}

/// Runs `extract_document` on the blocking pool, failing after `deadline`.
pub async fn extract_with_deadline(
    file: UploadedFile,
    deadline: Duration,
) -> Result<ExtractedDocument, ExtractionError> {
    extract_with_deadline_using(move || extract_document(&file), deadline).await
}

/// Runs an extraction closure on the blocking pool, failing after `deadline`.
///
/// On timeout the worker thread is abandoned (it cannot be interrupted), but the
/// caller gets a bounded-time `ExtractionFailed`.
pub async fn extract_with_deadline_using<F>(
    work: F,
    deadline: Duration,
) -> Result<ExtractedDocument, ExtractionError>
where
    F: FnOnce() -> Result<ExtractedDocument, ExtractionError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ExtractionError::failed(format!(
            "extraction worker failed: {join_err}"
        ))),
        Err(_) => Err(ExtractionError::failed(format!(
            "extraction exceeded {} ms",
            deadline.as_millis()
        ))),
    }
}

/// Lowercases and collapses every whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}
