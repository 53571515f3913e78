//! Report link resolution: ingredient id → absolute report PDF URL.
//!
//! Each ingredient has a status page on the report site whose first table
//! links to the report. The link is usually relative with one or more `../`
//! segments (`../../docs/report.pdf`); those are dropped and the remainder
//! is joined onto the site root.

use crate::config::ScanConfig;
use crate::error::ToxScanError;
use crate::pipeline::download;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Status page URL for an ingredient id.
pub fn status_page_url(config: &ScanConfig, ingredient_id: &str) -> String {
    config.site_url(&format!("cir-ingredient-status-report/?id={ingredient_id}"))
}

/// Pull the report URL out of a status page.
///
/// # Errors
/// [`ToxScanError::ReportLinkNotFound`] when the page has no table, the
/// first table has no anchor, or that anchor has no `href`.
pub fn parse_report_link(
    html: &str,
    config: &ScanConfig,
    ingredient_id: &str,
) -> Result<String, ToxScanError> {
    let not_found = |reason: &str| ToxScanError::ReportLinkNotFound {
        ingredient_id: ingredient_id.to_string(),
        reason: reason.to_string(),
    };

    let document = Html::parse_document(html);
    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| not_found("status page has no table"))?;
    let anchor = table
        .select(&ANCHOR)
        .next()
        .ok_or_else(|| not_found("first table has no link"))?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| not_found("link has no href"))?;

    debug!("Status page href for {}: {}", ingredient_id, href);
    Ok(absolutize(href.trim(), config))
}

fn absolutize(href: &str, config: &ScanConfig) -> String {
    if download::is_url(href) {
        return href.to_string();
    }
    config.site_url(&href.replace("../", ""))
}

/// Fetch the status page for `ingredient_id` and resolve its report URL.
pub async fn resolve_report_link(
    client: &reqwest::Client,
    config: &ScanConfig,
    ingredient_id: &str,
) -> Result<String, ToxScanError> {
    let url = status_page_url(config, ingredient_id);
    let html = download::get_text(client, &url, config).await?;
    let link = parse_report_link(&html, config, ingredient_id)?;
    info!("Report for {}: {}", ingredient_id, link);
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScanConfig {
        ScanConfig::builder()
            .base_url("https://reports.example.org")
            .build()
            .unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><body><h1>Status</h1>{body}</body></html>")
    }

    #[test]
    fn relative_link_is_joined_to_site_root() {
        let html = page(
            r#"<table><tr><td><a href="../../docs/FR812.pdf">Final Report</a></td></tr></table>"#,
        );
        assert_eq!(
            parse_report_link(&html, &config(), "id-1").unwrap(),
            "https://reports.example.org/docs/FR812.pdf"
        );
    }

    #[test]
    fn leading_slash_is_not_doubled() {
        let html = page(r#"<table><tr><td><a href="/docs/a.pdf">x</a></td></tr></table>"#);
        assert_eq!(
            parse_report_link(&html, &config(), "id").unwrap(),
            "https://reports.example.org/docs/a.pdf"
        );
    }

    #[test]
    fn absolute_link_is_unchanged() {
        let html = page(
            r#"<table><tr><td><a href="https://cdn.example.net/r.pdf">x</a></td></tr></table>"#,
        );
        assert_eq!(
            parse_report_link(&html, &config(), "id").unwrap(),
            "https://cdn.example.net/r.pdf"
        );
    }

    #[test]
    fn only_first_table_and_first_anchor_count() {
        let html = page(
            r#"<a href="../outside.pdf">nav</a>
               <table><tr><td><a href="../first.pdf">1</a><a href="../second.pdf">2</a></td></tr></table>
               <table><tr><td><a href="../other.pdf">3</a></td></tr></table>"#,
        );
        assert_eq!(
            parse_report_link(&html, &config(), "id").unwrap(),
            "https://reports.example.org/first.pdf"
        );
    }

    #[test]
    fn missing_structure_is_link_not_found() {
        let cases = [
            page("<p>No reports yet</p>"),
            page("<table><tr><td>pending</td></tr></table>"),
            page("<table><tr><td><a name=\"x\">anchor</a></td></tr></table>"),
        ];
        for html in &cases {
            let err = parse_report_link(html, &config(), "id-9").unwrap_err();
            match err {
                ToxScanError::ReportLinkNotFound { ingredient_id, .. } => {
                    assert_eq!(ingredient_id, "id-9")
                }
                other => panic!("expected ReportLinkNotFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn status_page_url_carries_id() {
        assert_eq!(
            status_page_url(&config(), "ABC-123"),
            "https://reports.example.org/cir-ingredient-status-report/?id=ABC-123"
        );
    }
}
