use crate::models::{Listing, SeoPage};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for everything that can hand us listings and stored pages.
/// The SEO code only ever needs these two flat collections.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the candidate listings
    async fn fetch_listings(&self) -> Result<Vec<Listing>>;

    /// Fetch the stored landing page definitions
    async fn fetch_pages(&self) -> Result<Vec<SeoPage>>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
