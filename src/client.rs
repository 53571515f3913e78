//! End-to-end client: ingredient name → report URL → scan.
//!
//! [`ReportClient`] holds one HTTP client and two [`MemoCache`]s: loaded
//! catalogs (keyed by the page list) and resolved report URLs (keyed by
//! ingredient id). Reusing one client for a session means the catalog is
//! downloaded once and each status page at most once.

use crate::cache::MemoCache;
use crate::catalog::{self, Catalog, Ingredient};
use crate::config::ScanConfig;
use crate::error::ToxScanError;
use crate::output::{IngredientReport, ScanOutput};
use crate::pipeline::download;
use crate::resolver;
use crate::scan;
use std::sync::Arc;
use tracing::{info, warn};

/// Cached access to the report site.
///
/// # Example
/// ```rust,no_run
/// use cir_toxscan::{ReportClient, ScanConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReportClient::new(ScanConfig::default())?;
/// let report = client.scan_ingredient("Glycerin").await?;
/// println!("{} NOAEL matches in {}", report.output.matches.noael.len(), report.pdf_url);
/// # Ok(())
/// # }
/// ```
pub struct ReportClient {
    http: reqwest::Client,
    config: ScanConfig,
    catalogs: MemoCache<Vec<u32>, Arc<Catalog>>,
    report_links: MemoCache<String, String>,
}

impl ReportClient {
    pub fn new(config: ScanConfig) -> Result<Self, ToxScanError> {
        let http = download::build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            catalogs: MemoCache::new(),
            report_links: MemoCache::new(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The ingredient catalog for the configured pages, fetched on first use.
    pub async fn load_catalog(&self) -> Result<Arc<Catalog>, ToxScanError> {
        self.catalogs
            .get_or_try_compute(self.config.catalog_pages.clone(), || async {
                catalog::fetch_catalog(&self.http, &self.config)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// First catalog row with display name `name`.
    ///
    /// # Errors
    /// [`ToxScanError::IngredientNotFound`] when no row has that name.
    pub async fn find_ingredient(&self, name: &str) -> Result<Ingredient, ToxScanError> {
        let catalog = self.load_catalog().await?;
        match catalog.find(name) {
            Some(ingredient) => Ok(ingredient.clone()),
            None => {
                warn!("Ingredient not found: {}", name);
                Err(ToxScanError::IngredientNotFound {
                    name: name.to_string(),
                })
            }
        }
    }

    /// Absolute report URL for an ingredient id, resolved on first use.
    pub async fn resolve_report_link(&self, ingredient_id: &str) -> Result<String, ToxScanError> {
        self.report_links
            .get_or_try_compute(ingredient_id.to_string(), || {
                resolver::resolve_report_link(&self.http, &self.config, ingredient_id)
            })
            .await
    }

    /// True once the report URL for `ingredient_id` is cached.
    pub async fn is_link_cached(&self, ingredient_id: &str) -> bool {
        self.report_links
            .is_computed(&ingredient_id.to_string())
            .await
    }

    /// True once the catalog for the configured pages is cached.
    pub async fn is_catalog_cached(&self) -> bool {
        self.catalogs.is_computed(&self.config.catalog_pages).await
    }

    /// Download and scan the report at `pdf_url`.
    pub async fn scan_report(&self, pdf_url: &str) -> Result<ScanOutput, ToxScanError> {
        scan::scan_url_with(&self.http, pdf_url, &self.config).await
    }

    /// Look up `name`, resolve its report and scan it.
    pub async fn scan_ingredient(&self, name: &str) -> Result<IngredientReport, ToxScanError> {
        info!("Scanning ingredient: {}", name);

        // ── Step 1: Catalog lookup ───────────────────────────────────────
        let ingredient = self.find_ingredient(name).await?;

        // ── Step 2: Resolve report link ──────────────────────────────────
        let pdf_url = self.resolve_report_link(&ingredient.ingredient_id).await?;

        // ── Step 3: Download, extract, scan ──────────────────────────────
        let output = self.scan_report(&pdf_url).await?;

        Ok(IngredientReport {
            ingredient,
            pdf_url,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_client_has_empty_caches() {
        let client = ReportClient::new(ScanConfig::default()).unwrap();
        assert!(!client.is_catalog_cached().await);
        assert!(!client.is_link_cached("id").await);
        assert_eq!(client.config().catalog_pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn unreachable_site_is_not_cached() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let config = ScanConfig::builder()
            .base_url(format!("http://127.0.0.1:{port}"))
            .build()
            .unwrap();
        let client = ReportClient::new(config).unwrap();

        let err = client.load_catalog().await.unwrap_err();
        assert!(err.is_retrieval_failure(), "got {err:?}");
        assert!(!client.is_catalog_cached().await);
    }
}
