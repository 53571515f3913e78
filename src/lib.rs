//! # cir-toxscan
//!
//! Find NOAEL and LD50 statements in Cosmetic Ingredient Review (CIR) safety
//! reports.
//!
//! CIR publishes a safety assessment PDF per cosmetic ingredient. Toxicology
//! reference values are buried in running prose, usually hard-wrapped across
//! two lines. This crate pulls the report for an ingredient, extracts the text
//! page by page, and returns every line that states a NOAEL or LD50 value,
//! together with the line before it and inline highlighting of grouped
//! numbers, species and dose units.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ingredient name
//!  │
//!  ├─ 1. Catalog   paginated JSON, pages fetched concurrently   (cached)
//!  ├─ 2. Resolve   status page HTML → first table link → PDF URL (cached)
//!  ├─ 3. Download  GET PDF bytes; non-success status stops here
//!  ├─ 4. Extract   per-page text via lopdf (spawn_blocking)
//!  ├─ 5. Scan      NOAEL / LD50 line patterns + previous-line context
//!  └─ 6. Highlight grouped numbers red-bold, keywords on yellow
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cir_toxscan::{ReportClient, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReportClient::new(ScanConfig::default())?;
//!     let report = client.scan_ingredient("Glycerin").await?;
//!     for w in &report.output.warnings {
//!         eprintln!("warning: {w}");
//!     }
//!     println!("{}", report.output.matches.to_html());
//!     Ok(())
//! }
//! ```
//!
//! Already have the PDF? Use [`scan_file`] or [`scan_bytes`]. The scanner and
//! highlighter are plain functions ([`scan_pages`], [`highlight`]) over text.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cir-toxscan` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cir-toxscan = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::MemoCache;
pub use catalog::{Catalog, Ingredient};
pub use client::ReportClient;
pub use config::{ScanConfig, ScanConfigBuilder, DEFAULT_BASE_URL};
pub use error::{PageError, ToxScanError};
pub use output::{
    ExtractedDocument, IngredientReport, Match, MatchSet, PageText, ScanOutput, ScanStats,
    ValueKind, NO_MATCHES_MESSAGE,
};
pub use pipeline::extract::{extract_pages, extract_pages_blocking, PageTextSource};
pub use pipeline::highlight::highlight;
pub use pipeline::values::scan_pages;
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use scan::{scan_bytes, scan_bytes_blocking, scan_file, scan_file_sync, scan_url, write_report};
