//! Error types for the cir-toxscan library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ToxScanError`] — **Fatal**: the operation cannot produce a result at
//!   all (report download returned a non-success status, the bytes are not a
//!   PDF, the catalog JSON is malformed, the ingredient does not exist).
//!   Returned as `Err(ToxScanError)` from the top-level `scan*` functions and
//!   from [`crate::client::ReportClient`].
//!
//! * [`PageError`] — **Non-fatal**: a single page yielded no text or failed
//!   to extract, but the rest of the document is fine. Stored inside
//!   [`crate::output::ScanOutput::warnings`] so one bad page never costs the
//!   caller the other pages.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cir-toxscan library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::ScanOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ToxScanError {
    // ── Retrieval errors ──────────────────────────────────────────────────
    /// The server answered, but with a non-success status. Extraction is
    /// never attempted on such a response.
    #[error("Failed to retrieve '{url}': HTTP status {status}")]
    RetrievalFailed { url: String, status: u16 },

    /// Transport-level failure (DNS, connection refused, body read error).
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {secs}s for '{url}'\nIncrease --timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// Local input file was not found.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes do not start with the `%PDF` header.
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The PDF could not be parsed as a whole.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    // ── Catalog / lookup errors ───────────────────────────────────────────
    /// Catalog endpoint returned something that is not the expected JSON.
    #[error("Failed to parse ingredient catalog from '{url}': {detail}")]
    CatalogParse { url: String, detail: String },

    /// The selected display name has no row in the catalog.
    #[error("Ingredient '{name}' not found in the catalog")]
    IngredientNotFound { name: String },

    /// The status page has no table/anchor pointing at a report.
    #[error("No report link found for ingredient id '{ingredient_id}': {reason}")]
    ReportLinkNotFound {
        ingredient_id: String,
        reason: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToxScanError {
    /// True when the error means "the server did not hand us the document",
    /// as opposed to the document itself being bad.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            ToxScanError::RetrievalFailed { .. }
                | ToxScanError::DownloadFailed { .. }
                | ToxScanError::DownloadTimeout { .. }
        )
    }
}

/// A non-fatal problem with a single page.
///
/// Stored in [`crate::output::ScanOutput::warnings`]; extraction continues
/// with the next page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page was read but produced no text (scanned image, blank page).
    #[error("Page {page}: no text found")]
    EmptyPage { page: usize },

    /// Text extraction raised an error for this page only.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number the warning refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::EmptyPage { page } | PageError::ExtractionFailed { page, .. } => *page,
        }
    }
}
