//! HTTP retrieval: catalog JSON, status-page HTML and report PDF bytes.
//!
//! Every request goes through [`get_response`], which turns a non-success
//! status into [`ToxScanError::RetrievalFailed`] before any body is read.
//! Callers therefore never see the body of an error page, and extraction is
//! never attempted on one.

use crate::config::ScanConfig;
use crate::error::ToxScanError;
use std::time::Duration;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Build the shared HTTP client from the configuration.
pub fn build_http_client(config: &ScanConfig) -> Result<reqwest::Client, ToxScanError> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ToxScanError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// GET `url` and return the body as text.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    config: &ScanConfig,
) -> Result<String, ToxScanError> {
    let response = get_response(client, url, config).await?;
    response
        .text()
        .await
        .map_err(|e| transport_error(url, config, e))
}

/// GET `url` and return the raw body bytes.
pub async fn get_bytes(
    client: &reqwest::Client,
    url: &str,
    config: &ScanConfig,
) -> Result<Vec<u8>, ToxScanError> {
    info!("Downloading report from: {}", url);
    let response = get_response(client, url, config).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, config, e))?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

async fn get_response(
    client: &reqwest::Client,
    url: &str,
    config: &ScanConfig,
) -> Result<reqwest::Response, ToxScanError> {
    debug!("GET {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(url, config, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ToxScanError::RetrievalFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

fn transport_error(url: &str, config: &ScanConfig, e: reqwest::Error) -> ToxScanError {
    if e.is_timeout() {
        ToxScanError::DownloadTimeout {
            url: url.to_string(),
            secs: config.request_timeout_secs.unwrap_or_default(),
        }
    } else {
        ToxScanError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
