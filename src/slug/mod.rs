pub mod listing;
pub mod text;

pub use listing::{
    generate_listing_slug, listing_url, parse_listing_slug, short_id, ParsedListingSlug,
};
pub use text::{slugify, title_case};
