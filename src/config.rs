//! Configuration for catalog lookups and report scanning.
//!
//! All network behaviour is controlled through [`ScanConfig`], built via its
//! [`ScanConfigBuilder`]. The scanner and highlighter themselves take no
//! configuration: their patterns are fixed.

use crate::error::ToxScanError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Root of the public CIR report site.
pub const DEFAULT_BASE_URL: &str = "https://cir-reports.cir-safety.org";

/// Configuration for a [`crate::client::ReportClient`] and the `scan*` entry points.
///
/// # Example
/// ```rust
/// use cir_toxscan::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .catalog_pages(vec![1, 2, 3])
///     .request_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.catalog_pages, vec![1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct ScanConfig {
    /// Report site root, without a trailing slash.
    ///
    /// The catalog endpoint, the per-ingredient status page and relative PDF
    /// links found on that page are all resolved against it.
    pub base_url: String,

    /// Catalog pages to fetch. Default: `[1, 2]`.
    ///
    /// Pages are requested concurrently and concatenated in this order, so
    /// the first row for a duplicated display name comes from the earliest
    /// page listed.
    pub catalog_pages: Vec<u32>,

    /// Per-request timeout in seconds. Default: `None` (wait indefinitely).
    pub request_timeout_secs: Option<u64>,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Receives per-page warnings and extraction progress.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog_pages: vec![1, 2],
            request_timeout_secs: None,
            user_agent: concat!("cir-toxscan/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("base_url", &self.base_url)
            .field("catalog_pages", &self.catalog_pages)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ScanProgressCallback>"),
            )
            .finish()
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }

    /// Join a site-relative path onto [`Self::base_url`].
    pub fn site_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn catalog_pages(mut self, pages: Vec<u32>) -> Self {
        self.config.catalog_pages = pages;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, ToxScanError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ToxScanError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.catalog_pages.is_empty() {
            return Err(ToxScanError::InvalidConfig(
                "at least one catalog page is required".into(),
            ));
        }
        if c.catalog_pages.contains(&0) {
            return Err(ToxScanError::InvalidConfig(
                "catalog pages are 1-indexed".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ToxScanError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
