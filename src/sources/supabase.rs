use crate::models::{Listing, SeoPage};
use crate::sources::traits::ListingSource;
use crate::sources::types::SourceParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const LISTING_COLUMNS: &str = "id,state,city,neighborhood,bedrooms,property_type,\
transaction_type,url_slug,active,scraped_at,last_seen_at";
const PAGE_COLUMNS: &str = "page_slug,filters,listing_count,updated_at";

/// Reads listings and pages from a hosted Supabase (PostgREST) project
pub struct SupabaseSource {
    client: Client,
    params: SourceParams,
}

impl SupabaseSource {
    /// Create a new source for the given project
    pub fn new(params: SourceParams) -> Result<Self> {
        if params.api_key.is_empty() {
            warn!("No API key configured for {}", params.base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, params })
    }

    fn listings_url(&self) -> String {
        let mut url = format!(
            "{}/rest/v1/{}?select={}&order=id.asc",
            self.params.base_url.trim_end_matches('/'),
            self.params.listings_table,
            LISTING_COLUMNS
        );
        if self.params.active_only {
            url.push_str("&active=eq.true");
        }
        url
    }

    fn pages_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select={}&order=listing_count.desc",
            self.params.base_url.trim_end_matches('/'),
            self.params.pages_table,
            PAGE_COLUMNS
        )
    }

    /// Fetch one `Range` window of rows
    async fn fetch_window<T: DeserializeOwned>(&self, url: &str, from: usize) -> Result<Vec<T>> {
        let to = from + self.params.page_size.max(1) - 1;
        debug!("Fetching rows {}-{} from {}", from, to, url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.params.api_key)
            .bearer_auth(&self.params.api_key)
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", from, to))
            .send()
            .await
            .context("Failed to reach Supabase")?;

        if !response.status().is_success() {
            warn!("Supabase returned status: {}", response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        response
            .json()
            .await
            .context("Failed to decode Supabase response")
    }

    /// Page through a table until a short window comes back
    async fn fetch_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let page_size = self.params.page_size.max(1);
        let mut rows = Vec::new();
        let mut from = 0;

        loop {
            let window: Vec<T> = self.fetch_window(url, from).await?;
            let received = window.len();
            rows.extend(window);

            debug!("Fetched {} rows so far", rows.len());

            if received < page_size {
                break;
            }
            from += page_size;
        }

        Ok(rows)
    }
}

#[async_trait]
impl ListingSource for SupabaseSource {
    async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        info!("Fetching listings from {}", self.params.base_url);
        let listings: Vec<Listing> = self.fetch_all(&self.listings_url()).await?;
        info!("Fetched {} listings", listings.len());
        Ok(listings)
    }

    async fn fetch_pages(&self) -> Result<Vec<SeoPage>> {
        info!("Fetching SEO pages from {}", self.params.base_url);
        let pages: Vec<SeoPage> = self.fetch_all(&self.pages_url()).await?;
        info!("Fetched {} pages", pages.len());
        Ok(pages)
    }

    fn source_name(&self) -> &'static str {
        "Supabase"
    }
}
