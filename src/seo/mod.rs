pub mod meta;
pub mod opportunity;
pub mod sitemap;
pub mod url;

pub use meta::{meta_description, page_title, PageMetadata};
pub use opportunity::{find_opportunities, missing_pages, recount_pages, PageOpportunity};
pub use url::{generate_seo_url, parse_seo_url, ParsedSeoUrl, SeoUrlError};
