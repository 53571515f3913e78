//! Ingredient catalog: the list of ingredients the report site knows about.
//!
//! The site serves the catalog as paginated JSON
//! (`{"results": [{"pcpc_ingredientname": ..., "pcpc_ingredientid": ...}, ...]}`).
//! Configured pages are fetched concurrently and concatenated in the order
//! they were configured, then exposed as a fixed [`Ingredient`] record list.

use crate::config::ScanConfig;
use crate::error::ToxScanError;
use crate::pipeline::download;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Paging cookie the report site expects on catalog requests.
const PAGING_COOKIE: &str = "%26lt%3Bcookie+page%3D%26quot%3B1%26quot%3B%26gt%3B%26lt%3Bpcpc_name+last%3D%26quot%3BPEG-50+Stearate%26quot%3B+first%3D%26quot%3B1%2C10-Decanediol%26quot%3B+%2F%26gt%3B%26lt%3Bpcpc_ingredientidname+last%3D%26quot%3BPEG-50+Stearate%26quot%3B+first%3D%26quot%3B1%2C10-Decanediol%26quot%3B+%2F%26gt%3B%26lt%3Bpcpc_cirrelatedingredientsid+last%3D%26quot%3B%7BC223037E-F278-416D-A287-2007B9671D0C%7D%26quot%3B+first%3D%26quot%3B%7B940AF697-52B5-4A3A-90A6-B9DB30EF4A7E%7D%26quot%3B+%2F%26gt%3B%26lt%3B%2Fcookie%26gt%3B";

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Display name. Not unique across the catalog.
    pub ingredient_name: String,
    /// Opaque identifier used to look up the status page.
    pub ingredient_id: String,
}

#[derive(Deserialize)]
struct CatalogPage {
    #[serde(default)]
    results: Vec<RawRow>,
}

#[derive(Deserialize)]
struct RawRow {
    pcpc_ingredientname: Option<String>,
    pcpc_ingredientid: Option<String>,
}

/// The concatenated catalog, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
}

impl Catalog {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self { ingredients }
    }

    /// First row whose display name equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.ingredient_name == name)
    }

    /// Unique display names, in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.ingredients
            .iter()
            .map(|i| i.ingredient_name.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    }

    /// Unique display names containing `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        self.names()
            .into_iter()
            .filter(|n| n.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter()
    }
}

/// URL of one catalog page.
pub fn catalog_url(config: &ScanConfig, page: u32) -> String {
    config.site_url(&format!(
        "FetchCIRReports?&pagingcookie={PAGING_COOKIE}&page={page}"
    ))
}

/// Parse one catalog page body. Rows missing a name or id are skipped.
pub fn parse_catalog_page(url: &str, body: &str) -> Result<Vec<Ingredient>, ToxScanError> {
    let page: CatalogPage =
        serde_json::from_str(body).map_err(|e| ToxScanError::CatalogParse {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

    let mut rows = Vec::with_capacity(page.results.len());
    for (i, raw) in page.results.into_iter().enumerate() {
        match (raw.pcpc_ingredientname, raw.pcpc_ingredientid) {
            (Some(ingredient_name), Some(ingredient_id)) => rows.push(Ingredient {
                ingredient_name,
                ingredient_id,
            }),
            _ => debug!("Skipping catalog row {} of {}: missing name or id", i, url),
        }
    }
    Ok(rows)
}

/// Fetch every configured catalog page concurrently and concatenate them.
///
/// Any failing page fails the whole load.
pub async fn fetch_catalog(
    client: &reqwest::Client,
    config: &ScanConfig,
) -> Result<Catalog, ToxScanError> {
    info!("Loading catalog pages {:?}", config.catalog_pages);

    let pages = try_join_all(config.catalog_pages.iter().map(|&page| async move {
        let url = catalog_url(config, page);
        let body = download::get_text(client, &url, config).await?;
        parse_catalog_page(&url, &body)
    }))
    .await?;

    let catalog = Catalog::new(pages.into_iter().flatten().collect());
    info!("Catalog loaded: {} ingredients", catalog.len());
    Ok(catalog)
}
