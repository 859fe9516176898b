//! Per-format decoders. Each returns raw text; normalization happens in the caller.

use std::panic::{catch_unwind, AssertUnwindSafe};

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};

use super::ExtractionError;

/// Third-party parsers occasionally panic on malformed input; turn that into an error.
fn guard_panics<T>(
    what: &str,
    f: impl FnOnce() -> Result<T, ExtractionError>,
) -> Result<T, ExtractionError> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|_| Err(ExtractionError::failed(format!("{what} parser panicked"))))
}

pub(super) fn pdf_text(data: &[u8]) -> Result<String, ExtractionError> {
    guard_panics("PDF", || {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractionError::failed(format!("invalid PDF: {e}")))
    })
}

pub(super) fn docx_text(data: &[u8]) -> Result<String, ExtractionError> {
    guard_panics("DOCX", || {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| ExtractionError::failed(format!("invalid DOCX: {e}")))?;

        // Body paragraphs first, then table cells.
        let mut parts = Vec::new();
        let mut cells = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => push_non_empty(&mut parts, paragraph_text(p)),
                DocumentChild::Table(table) => {
                    for row in &table.rows {
                        #[allow(irrefutable_let_patterns)]
                        let TableChild::TableRow(row) = row else { continue };
                        for cell in &row.cells {
                            #[allow(irrefutable_let_patterns)]
                            let TableRowChild::TableCell(cell) = cell else { continue };
                            for content in &cell.children {
                                if let TableCellContent::Paragraph(p) = content {
                                    push_non_empty(&mut cells, paragraph_text(p));
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        parts.extend(cells);
        Ok(parts.join("\n"))
    })
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn push_non_empty(parts: &mut Vec<String>, text: String) {
    if !text.trim().is_empty() {
        parts.push(text);
    }
}

/// UTF-8 first (BOM stripped), Latin-1 otherwise. Latin-1 maps every byte, so
/// decoding itself never fails; NUL bytes mean the file is not really text.
pub(super) fn plain_text(data: &[u8]) -> Result<String, ExtractionError> {
    if data.contains(&0) {
        return Err(ExtractionError::failed("binary content in text file"));
    }
    match std::str::from_utf8(data) {
        Ok(text) => Ok(text.trim_start_matches('\u{feff}').to_string()),
        Err(_) => Ok(data.iter().map(|&b| b as char).collect()),
    }
}
