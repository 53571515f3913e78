//! Report scanning entry points.
//!
//! Each entry point ends in the same two steps: extract per-page text, then
//! scan it for NOAEL / LD50 statements. They differ only in where the PDF
//! bytes come from. Use [`crate::client::ReportClient`] to start from an
//! ingredient name instead.

use crate::config::ScanConfig;
use crate::error::{PageError, ToxScanError};
use crate::output::{ExtractedDocument, ScanOutput, ScanStats};
use crate::pipeline::{download, extract, values};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Extract and scan a PDF already in memory.
///
/// # Returns
/// `Ok(ScanOutput)` even when pages were empty or failed (see
/// `output.warnings`) and when nothing matched (`output.matches.is_empty()`).
///
/// # Errors
/// [`ToxScanError::NotAPdf`] / [`ToxScanError::CorruptPdf`] when the
/// document as a whole cannot be read.
///
/// # Example
/// ```rust,no_run
/// use cir_toxscan::{scan_bytes, ScanConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("report.pdf")?;
/// let output = scan_bytes(bytes, &ScanConfig::default()).await?;
/// for m in &output.matches.noael {
///     println!("p.{}: {}", m.page_num, m.snippet);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn scan_bytes(bytes: Vec<u8>, config: &ScanConfig) -> Result<ScanOutput, ToxScanError> {
    let start = Instant::now();

    // ── Step 1: Extract page text ────────────────────────────────────────
    let doc = extract::extract_pages(bytes, config.progress_callback.clone()).await?;

    // ── Step 2: Scan for values ──────────────────────────────────────────
    Ok(scan_document(doc, start, config))
}

/// Blocking counterpart of [`scan_bytes`]; needs no async runtime.
pub fn scan_bytes_blocking(bytes: &[u8], config: &ScanConfig) -> Result<ScanOutput, ToxScanError> {
    let start = Instant::now();
    let doc = extract::extract_pages_blocking(bytes, config.progress_callback.as_ref())?;
    Ok(scan_document(doc, start, config))
}

/// Read a local PDF and scan it.
pub async fn scan_file(
    path: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<ScanOutput, ToxScanError> {
    let path = path.as_ref();
    info!("Scanning file: {}", path.display());
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ToxScanError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ToxScanError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;
    scan_bytes(bytes, config).await
}

/// Synchronous wrapper around [`scan_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn scan_file_sync(
    path: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<ScanOutput, ToxScanError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ToxScanError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(scan_file(path, config))
}

/// Download a report and scan it.
///
/// A non-success status stops here with [`ToxScanError::RetrievalFailed`];
/// extraction is not attempted.
pub async fn scan_url(url: &str, config: &ScanConfig) -> Result<ScanOutput, ToxScanError> {
    let client = download::build_http_client(config)?;
    scan_url_with(&client, url, config).await
}

pub(crate) async fn scan_url_with(
    client: &reqwest::Client,
    url: &str,
    config: &ScanConfig,
) -> Result<ScanOutput, ToxScanError> {
    let bytes = download::get_bytes(client, url, config).await?;
    scan_bytes(bytes, config).await
}

/// Write `contents` to `path` atomically (temp file + rename).
pub async fn write_report(path: impl AsRef<Path>, contents: &str) -> Result<(), ToxScanError> {
    let path = path.as_ref();
    let write_err = |e| ToxScanError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {}", path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn scan_document(doc: ExtractedDocument, start: Instant, config: &ScanConfig) -> ScanOutput {
    let matches = values::scan_pages(&doc.pages);

    let empty_pages = doc
        .warnings
        .iter()
        .filter(|w| matches!(w, PageError::EmptyPage { .. }))
        .count();
    let stats = ScanStats {
        total_pages: doc.total_pages,
        text_pages: doc.pages.len(),
        empty_pages,
        failed_pages: doc.warnings.len() - empty_pages,
        noael_matches: matches.noael.len(),
        ld50_matches: matches.ld50.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Scan complete: {} NOAEL, {} LD50 matches in {}/{} pages, {}ms",
        stats.noael_matches,
        stats.ld50_matches,
        stats.text_pages,
        stats.total_pages,
        stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(stats.noael_matches, stats.ld50_matches);
    }

    ScanOutput {
        matches,
        warnings: doc.warnings,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PageText;

    fn doc(pages: Vec<PageText>, warnings: Vec<PageError>, total: usize) -> ExtractedDocument {
        ExtractedDocument {
            pages,
            warnings,
            total_pages: total,
        }
    }

    #[test]
    fn stats_split_empty_and_failed_pages() {
        let d = doc(
            vec![PageText::new("NOAEL 5 mg/kg\nLD50 > 2,000 mg/kg", 1)],
            vec![
                PageError::EmptyPage { page: 2 },
                PageError::ExtractionFailed {
                    page: 3,
                    detail: "x".into(),
                },
            ],
            3,
        );
        let out = scan_document(d, Instant::now(), &ScanConfig::default());
        assert_eq!(out.stats.total_pages, 3);
        assert_eq!(out.stats.text_pages, 1);
        assert_eq!(out.stats.empty_pages, 1);
        assert_eq!(out.stats.failed_pages, 1);
        assert_eq!(out.stats.noael_matches, 1);
        assert_eq!(out.stats.ld50_matches, 1);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn zero_pages_is_not_an_error() {
        let out = scan_document(doc(vec![], vec![], 0), Instant::now(), &ScanConfig::default());
        assert!(out.matches.is_empty());
        assert_eq!(
            out.stats,
            ScanStats {
                duration_ms: out.stats.duration_ms,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = scan_file("/nonexistent/dir/report.pdf", &ScanConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToxScanError::FileNotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn non_pdf_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html></html>").unwrap();
        let err = scan_file(&path, &ScanConfig::default()).await.unwrap_err();
        assert!(matches!(err, ToxScanError::NotAPdf { .. }), "got {err:?}");
    }

    #[test]
    fn blocking_scan_rejects_garbage() {
        let err = scan_bytes_blocking(b"garbage", &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ToxScanError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/report.html");
        write_report(&path, "<p>ok</p>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>ok</p>");
        assert!(!dir.path().join("out/nested/report.html.tmp").exists());
    }
}
