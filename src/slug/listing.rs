use crate::models::Listing;
use crate::slug::text::slugify;

/// State segment used when a listing has no state
pub const FALLBACK_STATE: &str = "venezuela";
/// City segment used when a listing has no city
pub const FALLBACK_CITY: &str = "property";

const SHORT_ID_LEN: usize = 8;

/// Empty strings from the backend count as missing
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Compact suffix taken from the end of a listing identifier.
///
/// This is the last 8 characters, lowercased. It is not unique on its own;
/// the full listing path plus the stored identifier disambiguate.
pub fn short_id(id: &str) -> String {
    let len = id.chars().count();
    id.chars()
        .skip(len.saturating_sub(SHORT_ID_LEN))
        .collect::<String>()
        .to_lowercase()
}

/// Build the detail page slug for a listing.
///
/// Format: `{bedrooms}-bed-{type}-{neighborhood|city}-for-{sale|rent}-{short_id}`,
/// where everything before `for-` is optional.
pub fn generate_listing_slug(listing: &Listing) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(bedrooms) = listing.bedrooms.filter(|count| *count > 0) {
        parts.push(format!("{}-bed", bedrooms));
    }

    if let Some(kind) = listing.property_type {
        parts.push(slugify(kind.as_str()));
    }

    // Neighborhood reads better than the city when we have it
    if let Some(location) = present(&listing.neighborhood).or(present(&listing.city)) {
        parts.push(slugify(location));
    }

    let transaction = listing.transaction_type.unwrap_or_default();
    parts.push(format!("for-{}", transaction));

    parts.push(short_id(&listing.id));

    parts.join("-")
}

/// Full detail page path: `/property/{state}/{city}/{slug}`.
///
/// A stored `url_slug` wins over a freshly generated one.
pub fn listing_url(listing: &Listing) -> String {
    let slug = match listing.url_slug.as_deref() {
        Some(stored) if !stored.is_empty() => stored.to_string(),
        _ => generate_listing_slug(listing),
    };

    let state = present(&listing.state).map_or_else(|| FALLBACK_STATE.to_string(), slugify);
    let city = present(&listing.city).map_or_else(|| FALLBACK_CITY.to_string(), slugify);

    format!("/property/{}/{}/{}", state, city, slug)
}

/// What can be recovered from a detail page slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedListingSlug {
    pub short_id: String,
}

/// Pull the short identifier off the end of a listing slug
pub fn parse_listing_slug(slug: &str) -> ParsedListingSlug {
    let short_id = slug.rsplit('-').next().unwrap_or_default().to_string();
    ParsedListingSlug { short_id }
}
