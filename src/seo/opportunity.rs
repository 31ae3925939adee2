use crate::models::{Listing, SeoPage, SeoPageFilters};
use crate::seo::url::generate_seo_url;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Minimum number of listings before a combination deserves its own page
pub const DEFAULT_MIN_LISTINGS: u32 = 3;

/// A landing page the current listings could support
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOpportunity {
    pub filters: SeoPageFilters,
    pub listing_count: u32,
    pub slug: String,
}

/// Count listings per city+type, city+type+bedrooms and state+type and keep
/// the combinations with at least `min_listings` active listings.
///
/// Results are ordered by listing count, largest first.
pub fn find_opportunities(listings: &[Listing], min_listings: u32) -> Vec<PageOpportunity> {
    let mut counts: HashMap<SeoPageFilters, u32> = HashMap::new();

    for listing in listings.iter().filter(|listing| listing.active) {
        let Some(kind) = listing.property_type else {
            continue;
        };

        if let Some(city) = non_empty(&listing.city) {
            let city_filters = SeoPageFilters {
                city: Some(city.to_string()),
                property_type: Some(kind),
                ..Default::default()
            };

            if let Some(bedrooms) = listing.bedrooms.filter(|count| *count > 0) {
                let bedroom_filters = SeoPageFilters {
                    bedrooms: Some(bedrooms),
                    ..city_filters.clone()
                };
                *counts.entry(bedroom_filters).or_default() += 1;
            }

            *counts.entry(city_filters).or_default() += 1;
        }

        if let Some(state) = non_empty(&listing.state) {
            let state_filters = SeoPageFilters {
                state: Some(state.to_string()),
                property_type: Some(kind),
                ..Default::default()
            };
            *counts.entry(state_filters).or_default() += 1;
        }
    }

    debug!("Counted {} listing combinations", counts.len());

    let mut opportunities: Vec<PageOpportunity> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_listings)
        .map(|(filters, listing_count)| PageOpportunity {
            slug: generate_seo_url(&filters),
            filters,
            listing_count,
        })
        .collect();

    opportunities.sort_by(|a, b| {
        b.listing_count
            .cmp(&a.listing_count)
            .then_with(|| a.slug.cmp(&b.slug))
    });

    info!(
        "Found {} page opportunities with {}+ listings",
        opportunities.len(),
        min_listings
    );

    opportunities
}

/// Opportunities whose slug isn't one of the stored pages yet
pub fn missing_pages(opportunities: &[PageOpportunity], existing: &[SeoPage]) -> Vec<PageOpportunity> {
    let existing_slugs: HashSet<&str> = existing.iter().map(|page| page.page_slug.as_str()).collect();

    opportunities
        .iter()
        .filter(|opportunity| !existing_slugs.contains(opportunity.slug.as_str()))
        .cloned()
        .collect()
}

/// A stored page whose listing count no longer matches the listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountChange {
    pub page_slug: String,
    pub previous: u32,
    pub current: u32,
}

/// Recount active listings for every stored page and report the pages
/// whose count changed.
pub fn recount_pages(pages: &[SeoPage], listings: &[Listing]) -> Vec<CountChange> {
    let active: Vec<&Listing> = listings.iter().filter(|listing| listing.active).collect();

    let changes: Vec<CountChange> = pages
        .iter()
        .filter_map(|page| {
            let current = active
                .iter()
                .filter(|listing| page.filters.matches(listing))
                .count();
            let current = u32::try_from(current).unwrap_or(u32::MAX);

            (current != page.listing_count).then(|| CountChange {
                page_slug: page.page_slug.clone(),
                previous: page.listing_count,
                current,
            })
        })
        .collect();

    info!(
        "Recounted {} pages: {} changed, {} unchanged",
        pages.len(),
        changes.len(),
        pages.len() - changes.len()
    );

    changes
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;

    fn listing(id: &str, city: &str, state: &str, kind: PropertyType, bedrooms: u32) -> Listing {
        let mut listing = Listing::new(id);
        listing.city = Some(city.to_string());
        listing.state = Some(state.to_string());
        listing.property_type = Some(kind);
        listing.bedrooms = Some(bedrooms);
        listing
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("1", "Caracas", "Miranda", PropertyType::Apartment, 2),
            listing("2", "Caracas", "Miranda", PropertyType::Apartment, 2),
            listing("3", "Caracas", "Miranda", PropertyType::Apartment, 2),
            listing("4", "Caracas", "Miranda", PropertyType::Apartment, 3),
            listing("5", "Los Teques", "Miranda", PropertyType::House, 0),
            listing("6", "Los Teques", "Miranda", PropertyType::House, 4),
        ]
    }

    #[test]
    fn opportunities_meet_the_threshold() {
        let found = find_opportunities(&sample(), DEFAULT_MIN_LISTINGS);
        let slugs: Vec<(&str, u32)> = found
            .iter()
            .map(|o| (o.slug.as_str(), o.listing_count))
            .collect();

        assert_eq!(
            slugs,
            vec![
                ("/apartments-caracas", 4),
                ("/apartments-miranda-state", 4),
                ("/2-bedroom-apartments-caracas", 3),
            ]
        );
    }

    #[test]
    fn inactive_and_untyped_listings_are_ignored() {
        let mut listings = sample();
        listings[0].active = false;
        listings[1].property_type = None;

        let found = find_opportunities(&listings, DEFAULT_MIN_LISTINGS);
        assert!(found.is_empty());
    }

    #[test]
    fn missing_pages_skip_existing_slugs() {
        let found = find_opportunities(&sample(), DEFAULT_MIN_LISTINGS);
        let existing = vec![SeoPage {
            page_slug: "/apartments-caracas".to_string(),
            filters: found[0].filters.clone(),
            listing_count: 4,
            updated_at: None,
        }];

        let missing = missing_pages(&found, &existing);
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|o| o.slug != "/apartments-caracas"));
    }

    #[test]
    fn recount_reports_changes_only() {
        let pages = vec![
            SeoPage {
                page_slug: "/apartments-caracas".to_string(),
                filters: SeoPageFilters {
                    city: Some("caracas".to_string()),
                    property_type: Some(PropertyType::Apartment),
                    ..Default::default()
                },
                listing_count: 4,
                updated_at: None,
            },
            SeoPage {
                page_slug: "/houses-miranda-state".to_string(),
                filters: SeoPageFilters {
                    state: Some("Miranda".to_string()),
                    property_type: Some(PropertyType::House),
                    ..Default::default()
                },
                listing_count: 7,
                updated_at: None,
            },
        ];

        let changes = recount_pages(&pages, &sample());
        assert_eq!(
            changes,
            vec![CountChange {
                page_slug: "/houses-miranda-state".to_string(),
                previous: 7,
                current: 2,
            }]
        );
    }
}
