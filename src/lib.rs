//! SEO URL handling for a real-estate listing site.
//!
//! Two pure codecs sit at the core: flat landing-page URLs such as
//! `/2-bedroom-apartments-caracas` ([`seo::parse_seo_url`],
//! [`seo::generate_seo_url`]) and listing detail paths such as
//! `/property/miranda/caracas/3-bed-apartment-chacao-for-sale-abcd1234`
//! ([`slug::listing_url`]). Around them live page discovery, sitemaps, a
//! free-text search parser and the sources that feed listings in.

pub mod models;
pub mod search;
pub mod seo;
pub mod slug;
pub mod sources;

pub use models::{Listing, PropertyType, SeoPage, SeoPageFilters, TransactionType};
