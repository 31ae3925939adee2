use crate::models::{Listing, SeoPage};
use crate::sources::traits::ListingSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Listings and pages exported to JSON files
pub struct JsonFileSource {
    listings: Option<PathBuf>,
    pages: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new(listings: Option<PathBuf>, pages: Option<PathBuf>) -> Self {
        Self { listings, pages }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    debug!("Reading {}", path.display());

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[async_trait]
impl ListingSource for JsonFileSource {
    async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        let Some(path) = &self.listings else {
            warn!("No listings file given, using an empty listing set");
            return Ok(Vec::new());
        };

        let listings: Vec<Listing> = read_json(path).await?;
        info!("Loaded {} listings from {}", listings.len(), path.display());
        Ok(listings)
    }

    async fn fetch_pages(&self) -> Result<Vec<SeoPage>> {
        let Some(path) = &self.pages else {
            warn!("No pages file given, using an empty page set");
            return Ok(Vec::new());
        };

        let pages: Vec<SeoPage> = read_json(path).await?;
        info!("Loaded {} pages from {}", pages.len(), path.display());
        Ok(pages)
    }

    fn source_name(&self) -> &'static str {
        "JSON file"
    }
}
