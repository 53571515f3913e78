//! PDF text extraction: turn raw PDF bytes into per-page text.
//!
//! The document is parsed once with `lopdf`; each page is then asked for its
//! text in page-tree order. Page text is rebuilt from the decoded content
//! stream so that every visual line becomes one `\n`-terminated line, whether
//! the producer drew each line in its own text object or a whole paragraph in
//! one object moved by `Td` / `TD` / `T*` / `Tm` / `'` / `"`.
//!
//! Pages that come back empty (scanned images, blank separators) and pages
//! whose content stream fails to decode are turned into [`PageError`]
//! warnings and skipped. Only a failure to parse
//! the document itself is fatal.
//!
//! Parsing is CPU-bound and synchronous, so the async entry point moves it
//! onto the blocking pool with `tokio::task::spawn_blocking`.

use crate::error::{PageError, ToxScanError};
use crate::output::{ExtractedDocument, PageText};
use crate::progress::ProgressCallback;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Leading bytes every PDF file starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Per-page text access, independent of the PDF backend.
///
/// Indices are 0-based; the extractor reports page numbers as `index + 1`.
pub trait PageTextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text of the page at `index`, or a human-readable failure reason.
    fn page_text(&self, index: usize) -> Result<String, String>;
}

/// [`PageTextSource`] backed by a parsed `lopdf` document.
pub struct LopdfSource {
    doc: Document,
    /// Page object ids, in page-tree order.
    page_ids: Vec<ObjectId>,
}

impl LopdfSource {
    /// Parse `bytes` as a PDF.
    ///
    /// # Errors
    /// [`ToxScanError::NotAPdf`] when the `%PDF` header is missing,
    /// [`ToxScanError::CorruptPdf`] when the document cannot be parsed.
    pub fn load(bytes: &[u8]) -> Result<Self, ToxScanError> {
        check_pdf_magic(bytes)?;

        let doc = Document::load_mem(bytes).map_err(|e| ToxScanError::CorruptPdf {
            detail: e.to_string(),
        })?;
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        Ok(Self { doc, page_ids })
    }
}

impl PageTextSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, index: usize) -> Result<String, String> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or_else(|| format!("page index {index} out of range"))?;

        let encodings: BTreeMap<Vec<u8>, &str> = self
            .doc
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, font.get_font_encoding()))
            .collect();
        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| e.to_string())?;
        let content = Content::decode(&data).map_err(|e| e.to_string())?;

        Ok(content_text(&content.operations, &encodings))
    }
}

/// Rebuild the text of one content stream, one visual line per `\n`.
///
/// Line breaks come from `ET`, `T*`, `'`, `"`, a `Td`/`TD` with a vertical
/// offset, and a `Tm` that moves to a new baseline. A purely horizontal move
/// becomes a single space. `TJ` kerning wider than 100 thousandths of an em
/// is read as a word gap.
pub fn content_text(operations: &[Operation], encodings: &BTreeMap<Vec<u8>, &str>) -> String {
    let mut text = String::new();
    let mut encoding: Option<&str> = None;
    let mut baseline: Option<f32> = None;

    for op in operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => baseline = None,
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
            }
            "Tj" | "TJ" => show_text(&mut text, encoding, operands),
            "'" => {
                break_line(&mut text);
                show_text(&mut text, encoding, operands);
            }
            "\"" => {
                break_line(&mut text);
                // aw ac string
                show_text(&mut text, encoding, operands.get(2..).unwrap_or_default());
            }
            "T*" | "ET" => break_line(&mut text),
            "Td" | "TD" => {
                let ty = operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
                if ty != 0.0 {
                    break_line(&mut text);
                } else {
                    word_gap(&mut text);
                }
            }
            "Tm" => {
                let y = operands.get(5).and_then(|o| o.as_float().ok());
                if let (Some(prev), Some(y)) = (baseline, y) {
                    if (prev - y).abs() > f32::EPSILON {
                        break_line(&mut text);
                    } else {
                        word_gap(&mut text);
                    }
                }
                baseline = y;
            }
            _ => {}
        }
    }
    text
}

fn show_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)),
            Object::Array(items) => show_text(text, encoding, items),
            Object::Integer(_) | Object::Real(_) => {
                if operand.as_float().is_ok_and(|k| k < -100.0) {
                    word_gap(text);
                }
            }
            _ => {}
        }
    }
}

/// End the current line, unless nothing is on it yet.
fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn word_gap(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
}

/// Reject input that does not start with the PDF header.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), ToxScanError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(ToxScanError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        })
    }
}

/// Walk every page of `source` in order and collect the non-empty ones.
///
/// Never fails: empty and failing pages become warnings, which are logged,
/// forwarded to `callback` and recorded in the result.
pub fn collect_page_texts(
    source: &dyn PageTextSource,
    callback: Option<&ProgressCallback>,
) -> ExtractedDocument {
    let total_pages = source.page_count();
    info!("PDF loaded: {} pages", total_pages);
    if let Some(cb) = callback {
        cb.on_extraction_start(total_pages);
    }

    let mut doc = ExtractedDocument {
        total_pages,
        ..Default::default()
    };

    for index in 0..total_pages {
        let page_num = index + 1;
        let warning = match source.page_text(index) {
            Ok(text) if text.trim().is_empty() => PageError::EmptyPage { page: page_num },
            Ok(text) => {
                let chars = text.chars().count();
                debug!("Page {}: {} chars", page_num, chars);
                if let Some(cb) = callback {
                    cb.on_page_extracted(page_num, chars);
                }
                doc.pages.push(PageText::new(text, page_num));
                continue;
            }
            Err(detail) => PageError::ExtractionFailed {
                page: page_num,
                detail,
            },
        };

        warn!("{}", warning);
        if let Some(cb) = callback {
            cb.on_page_warning(&warning);
        }
        doc.warnings.push(warning);
    }

    info!(
        "Extracted text from {}/{} pages",
        doc.pages.len(),
        total_pages
    );
    if let Some(cb) = callback {
        cb.on_extraction_complete(total_pages, doc.pages.len());
    }
    doc
}

/// Parse `bytes` and extract every page, on the current thread.
pub fn extract_pages_blocking(
    bytes: &[u8],
    callback: Option<&ProgressCallback>,
) -> Result<ExtractedDocument, ToxScanError> {
    let source = LopdfSource::load(bytes)?;
    Ok(collect_page_texts(&source, callback))
}

/// Parse `bytes` and extract every page on the blocking thread pool.
pub async fn extract_pages(
    bytes: Vec<u8>,
    callback: Option<ProgressCallback>,
) -> Result<ExtractedDocument, ToxScanError> {
    tokio::task::spawn_blocking(move || extract_pages_blocking(&bytes, callback.as_ref()))
        .await
        .map_err(|e| ToxScanError::Internal(format!("Extraction task panicked: {}", e)))?
}
