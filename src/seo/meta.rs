use crate::models::SeoPageFilters;
use crate::seo::url::ParsedSeoUrl;
use serde::Serialize;

pub const SITE_NAME: &str = "Property.com.ve";

/// Human-readable label for a landing page, e.g. "3 Bedroom Houses in Valencia"
pub fn page_title(filters: &SeoPageFilters) -> String {
    let mut parts: Vec<&str> = Vec::new();

    let bedrooms = filters
        .bedroom_count()
        .map(|count| format!("{} Bedroom", count));
    if let Some(bedrooms) = &bedrooms {
        parts.push(bedrooms);
    }

    if let Some(kind) = filters.property_type {
        parts.push(kind.title_label());
    }

    let city = filters.city.as_deref().filter(|city| !city.is_empty());
    let state = filters.state.as_deref().filter(|state| !state.is_empty());
    if let Some(location) = city.or(state) {
        parts.push("in");
        parts.push(location);
    }

    parts.join(" ")
}

/// Meta description for a landing page with `listing_count` listings
pub fn meta_description(filters: &SeoPageFilters, listing_count: u32) -> String {
    let title = page_title(filters).to_lowercase();

    if listing_count == 0 {
        return format!(
            "Explore {} on {}. New listings added regularly.",
            title, SITE_NAME
        );
    }

    format!(
        "Browse {} {} for sale on {}. Find your dream property in Venezuela today.",
        listing_count, title, SITE_NAME
    )
}

/// Head metadata for a landing page without stored content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub site_name: &'static str,
}

impl PageMetadata {
    /// Fallback metadata built from a decoded URL
    pub fn fallback(parsed: &ParsedSeoUrl) -> Self {
        if !parsed.is_valid {
            return Self {
                title: format!("Page Not Found | {}", SITE_NAME),
                description: String::new(),
                og_title: String::new(),
                site_name: SITE_NAME,
            };
        }

        let title = page_title(&parsed.filters);
        Self {
            title: format!("{} | {}", title, SITE_NAME),
            description: meta_description(&parsed.filters, 0),
            og_title: title,
            site_name: SITE_NAME,
        }
    }
}
