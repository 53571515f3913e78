//! Progress-callback trait for extraction and scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ScanConfigBuilder::progress_callback`] to receive events
//! as the extractor walks the document. This is how page warnings reach the
//! presentation layer: the library never prints, it reports.
//!
//! # Example
//!
//! ```rust
//! use cir_toxscan::{PageError, ScanConfig, ScanProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct WarningCounter {
//!     warnings: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for WarningCounter {
//!     fn on_page_warning(&self, warning: &PageError) {
//!         self.warnings.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("warning: {warning}");
//!     }
//! }
//!
//! let counter = Arc::new(WarningCounter { warnings: AtomicUsize::new(0) });
//!
//! let config = ScanConfig::builder()
//!     .progress_callback(counter as Arc<dyn ScanProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::PageError;
use std::sync::Arc;

/// Called by the pipeline as it extracts and scans a document.
///
/// Implementations must be `Send + Sync`: extraction runs on a blocking
/// worker thread, not on the caller's task. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once after the document parsed, before any page is read.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page produced text.
    ///
    /// # Arguments
    /// * `page_num` — 1-indexed page number
    /// * `chars`    — number of characters extracted
    fn on_page_extracted(&self, page_num: usize, chars: usize) {
        let _ = (page_num, chars);
    }

    /// Called when a page was empty or failed; processing continues.
    fn on_page_warning(&self, warning: &PageError) {
        let _ = warning;
    }

    /// Called once after every page has been attempted.
    ///
    /// # Arguments
    /// * `total_pages` — pages in the document
    /// * `text_pages`  — pages that produced text
    fn on_extraction_complete(&self, total_pages: usize, text_pages: usize) {
        let _ = (total_pages, text_pages);
    }

    /// Called after the value scan with the number of matches of each kind.
    fn on_scan_complete(&self, noael_matches: usize, ld50_matches: usize) {
        let _ = (noael_matches, ld50_matches);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;
