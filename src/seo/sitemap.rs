use crate::models::{Listing, SeoPage};
use crate::slug::listing_url;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashSet;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Search engines stop reading a sitemap after this many URLs
pub const MAX_SITEMAP_URLS: usize = 50_000;

/// Child sitemaps listed by the index, relative to the site root
pub const SITEMAP_FILES: [&str; 5] = [
    "sitemap-static.xml",
    "sitemap-guides.xml",
    "sitemap-listings.xml",
    "sitemap-locations.xml",
    "sitemap-seo-pages.xml",
];

/// At most this many city search pages
const MAX_CITY_PAGES: usize = 100;
/// Per-type search pages are only built for the first states seen
const MAX_TYPED_STATES: usize = 10;
const TYPED_SEARCH_TYPES: [&str; 3] = ["apartment", "house", "land"];

/// Characters a query value may keep unescaped
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
}

impl ChangeFrequency {
    fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
        }
    }
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Pages backed by more listings rank higher
pub fn page_priority(listing_count: u32) -> f32 {
    if listing_count > 50 {
        0.9
    } else if listing_count > 20 {
        0.8
    } else {
        0.7
    }
}

/// Sitemap of the stored landing pages, busiest pages first
pub fn seo_pages_sitemap(base_url: &str, pages: &[SeoPage]) -> String {
    let base = base_url.trim_end_matches('/');

    let mut ordered: Vec<&SeoPage> = pages.iter().collect();
    ordered.sort_by(|a, b| b.listing_count.cmp(&a.listing_count));

    let entries: Vec<SitemapEntry> = ordered
        .into_iter()
        .map(|page| SitemapEntry {
            loc: format!("{}{}", base, page.page_slug),
            last_modified: page.updated_at,
            change_frequency: ChangeFrequency::Weekly,
            priority: page_priority(page.listing_count),
        })
        .collect();

    render(&entries)
}

/// Sitemap of active listing detail pages, most recently seen first
pub fn listings_sitemap(base_url: &str, listings: &[Listing]) -> String {
    render(&listing_entries(base_url, listings, MAX_SITEMAP_URLS))
}

/// Sort by recency before truncating so the freshest listings survive the cap
fn listing_entries(base_url: &str, listings: &[Listing], limit: usize) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');

    let mut active: Vec<&Listing> = listings.iter().filter(|listing| listing.active).collect();
    active.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));

    active
        .into_iter()
        .take(limit)
        .map(|listing| SitemapEntry {
            loc: format!("{}{}", base, listing_url(listing)),
            last_modified: listing.last_modified(),
            change_frequency: ChangeFrequency::Daily,
            priority: 0.8,
        })
        .collect()
}

/// Sitemap of location search pages derived from active listings.
///
/// One page per state, one per city (capped), and one per property type for
/// the first few states. States and cities keep the order they are first seen in.
pub fn locations_sitemap(base_url: &str, listings: &[Listing], now: DateTime<Utc>) -> String {
    render(&location_entries(base_url, listings, now))
}

fn location_entries(base_url: &str, listings: &[Listing], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let entry = |query: String, priority: f32| SitemapEntry {
        loc: format!("{}/search?{}", base, query),
        last_modified: Some(now),
        change_frequency: ChangeFrequency::Daily,
        priority,
    };

    let active: Vec<&Listing> = listings.iter().filter(|listing| listing.active).collect();

    let mut seen = HashSet::new();
    let states: Vec<&str> = active
        .iter()
        .filter_map(|listing| non_empty(&listing.state))
        .filter(|state| seen.insert(*state))
        .collect();

    let mut seen = HashSet::new();
    let cities: Vec<(&str, &str)> = active
        .iter()
        .filter_map(|listing| Some((non_empty(&listing.city)?, non_empty(&listing.state)?)))
        .filter(|pair| seen.insert(*pair))
        .take(MAX_CITY_PAGES)
        .collect();

    let mut entries = Vec::with_capacity(
        states.len() + cities.len() + MAX_TYPED_STATES * TYPED_SEARCH_TYPES.len(),
    );

    for state in &states {
        entries.push(entry(format!("state={}", encode(state)), 0.8));
    }

    for (city, state) in &cities {
        entries.push(entry(
            format!("state={}&city={}", encode(state), encode(city)),
            0.7,
        ));
    }

    for state in states.iter().take(MAX_TYPED_STATES) {
        for kind in TYPED_SEARCH_TYPES {
            entries.push(entry(
                format!("state={}&property_type={}", encode(state), kind),
                0.7,
            ));
        }
    }

    entries
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Render a sitemaps.org `sitemapindex` pointing at each child sitemap
pub fn sitemap_index(base_url: &str, files: &[&str], now: DateTime<Utc>) -> String {
    let base = base_url.trim_end_matches('/');
    let lastmod = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<sitemapindex xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for file in files {
        xml.push_str("  <sitemap>\n    <loc>");
        xml.push_str(&escape(&format!("{}/{}", base, file.trim_start_matches('/'))));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&lastmod);
        xml.push_str("</lastmod>\n  </sitemap>\n");
    }

    xml.push_str("</sitemapindex>\n");
    xml
}

/// Render entries as a sitemaps.org `urlset` document
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape(&entry.loc));
        xml.push_str("</loc>\n");
        if let Some(modified) = entry.last_modified {
            xml.push_str("    <lastmod>");
            xml.push_str(&modified.to_rfc3339_opts(SecondsFormat::Millis, true));
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("    <changefreq>");
        xml.push_str(entry.change_frequency.as_str());
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(&entry.priority.to_string());
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeoPageFilters;
    use chrono::TimeZone;

    fn page(slug: &str, listing_count: u32) -> SeoPage {
        SeoPage {
            page_slug: slug.to_string(),
            filters: SeoPageFilters::default(),
            listing_count,
            updated_at: Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).single(),
        }
    }

    #[test]
    fn priority_tiers() {
        assert_eq!(page_priority(51), 0.9);
        assert_eq!(page_priority(50), 0.8);
        assert_eq!(page_priority(21), 0.8);
        assert_eq!(page_priority(20), 0.7);
        assert_eq!(page_priority(0), 0.7);
    }

    #[test]
    fn seo_pages_are_ordered_by_count() {
        let xml = seo_pages_sitemap(
            "https://property.com.ve/",
            &[page("/land-margarita", 4), page("/apartments-caracas", 252)],
        );

        let caracas = xml.find("/apartments-caracas").unwrap();
        let margarita = xml.find("/land-margarita").unwrap();
        assert!(caracas < margarita);
        assert!(xml.contains("<loc>https://property.com.ve/apartments-caracas</loc>"));
        assert!(xml.contains("<lastmod>2025-01-15T08:30:00.000Z</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.9</priority>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn listings_sitemap_uses_detail_urls() {
        let mut seen = Listing::new("0000abcd1234");
        seen.city = Some("Caracas".to_string());
        seen.state = Some("Miranda".to_string());
        seen.last_seen_at = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).single();

        let mut hidden = Listing::new("zzzzzzzz");
        hidden.active = false;

        let undated = Listing::new("undated1");

        let xml = listings_sitemap("https://property.com.ve", &[undated, hidden, seen]);

        assert!(xml.contains(
            "<loc>https://property.com.ve/property/miranda/caracas/caracas-for-sale-abcd1234</loc>"
        ));
        assert!(!xml.contains("zzzzzzzz"));
        assert_eq!(xml.matches("<lastmod>").count(), 1);
        assert!(xml.find("abcd1234").unwrap() < xml.find("undated1").unwrap());
    }

    fn seen_at(id: &str, day: u32) -> Listing {
        let mut listing = Listing::new(id);
        listing.last_seen_at = Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).single();
        listing
    }

    #[test]
    fn cap_keeps_most_recently_seen_listings() {
        // Input order is oldest first, so truncating before sorting would keep the wrong two
        let listings = [
            seen_at("old00001", 1),
            seen_at("mid00002", 5),
            Listing::new("undated3"),
            seen_at("new00004", 9),
            seen_at("newer005", 20),
        ];

        let entries = listing_entries("https://property.com.ve", &listings, 2);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].loc.ends_with("for-sale-newer005"), "{}", entries[0].loc);
        assert!(entries[1].loc.ends_with("for-sale-new00004"), "{}", entries[1].loc);
        assert!(entries[0].last_modified > entries[1].last_modified);
    }

    fn located(id: &str, state: Option<&str>, city: Option<&str>) -> Listing {
        let mut listing = Listing::new(id);
        listing.state = state.map(str::to_string);
        listing.city = city.map(str::to_string);
        listing
    }

    #[test]
    fn location_pages_per_state_city_and_type() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let mut closed = located("3", Some("Zulia"), Some("Maracaibo"));
        closed.active = false;

        let listings = [
            located("1", Some("Distrito Capital"), Some("Caracas")),
            located("2", Some("Distrito Capital"), Some("Caracas")),
            closed,
            located("4", Some("Miranda"), Some("Los Teques")),
            located("5", Some(""), Some("Ghost Town")),
            located("6", None, Some("Nowhere")),
        ];

        let entries = location_entries("https://property.com.ve/", &listings, now);
        let locs: Vec<&str> = entries.iter().map(|entry| entry.loc.as_str()).collect();

        assert_eq!(
            &locs[..4],
            [
                "https://property.com.ve/search?state=Distrito%20Capital",
                "https://property.com.ve/search?state=Miranda",
                "https://property.com.ve/search?state=Distrito%20Capital&city=Caracas",
                "https://property.com.ve/search?state=Miranda&city=Los%20Teques",
            ]
        );
        assert_eq!(
            locs[4],
            "https://property.com.ve/search?state=Distrito%20Capital&property_type=apartment"
        );
        // 2 states + 2 cities + 2 states x 3 types
        assert_eq!(entries.len(), 10);
        assert!(!locs.iter().any(|loc| loc.contains("Zulia") || loc.contains("Ghost")));

        assert_eq!(entries[0].priority, 0.8);
        assert!(entries[2..].iter().all(|entry| entry.priority == 0.7));
        assert!(entries.iter().all(|entry| entry.last_modified == Some(now)));
    }

    #[test]
    fn location_pages_are_capped() {
        let now = Utc::now();
        let listings: Vec<Listing> = (0..120)
            .map(|i| located(&i.to_string(), Some(format!("State {i}").as_str()), Some("Centro")))
            .collect();

        let entries = location_entries("https://property.com.ve", &listings, now);
        let cities = entries.iter().filter(|entry| entry.loc.contains("&city=")).count();
        let typed = entries
            .iter()
            .filter(|entry| entry.loc.contains("&property_type="))
            .count();

        assert_eq!(cities, 100);
        assert_eq!(typed, 30);
        assert_eq!(entries.len(), 120 + 100 + 30);
    }

    #[test]
    fn locations_sitemap_escapes_query_separators() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let xml = locations_sitemap(
            "https://property.com.ve",
            &[located("1", Some("Mérida"), Some("El Vigía"))],
            now,
        );

        assert!(xml.contains(
            "<loc>https://property.com.ve/search?state=M%C3%A9rida&amp;city=El%20Vig%C3%ADa</loc>"
        ));
        assert!(xml.contains("<lastmod>2025-04-01T12:00:00.000Z</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
    }

    #[test]
    fn index_lists_every_child_sitemap() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let xml = sitemap_index("https://property.com.ve/", &SITEMAP_FILES, now);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains(&format!(r#"<sitemapindex xmlns="{SITEMAP_NS}">"#)));
        assert_eq!(xml.matches("<sitemap>").count(), SITEMAP_FILES.len());
        assert!(xml.contains("<loc>https://property.com.ve/sitemap-locations.xml</loc>"));
        assert!(xml.contains("<loc>https://property.com.ve/sitemap-seo-pages.xml</loc>"));
        assert_eq!(
            xml.matches("<lastmod>2025-04-01T12:00:00.000Z</lastmod>").count(),
            SITEMAP_FILES.len()
        );
        assert!(xml.ends_with("</sitemapindex>\n"));
    }

    #[test]
    fn render_layout() {
        let xml = render(&[SitemapEntry {
            loc: "https://property.com.ve/houses-valencia".to_string(),
            last_modified: None,
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.7,
        }]);

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
             <url>\n    \
             <loc>https://property.com.ve/houses-valencia</loc>\n    \
             <changefreq>weekly</changefreq>\n    \
             <priority>0.7</priority>\n  \
             </url>\n\
             </urlset>\n"
        );
    }

    #[test]
    fn loc_is_escaped() {
        let xml = render(&[SitemapEntry {
            loc: "https://example.com/?a=1&b=<2>".to_string(),
            last_modified: None,
            change_frequency: ChangeFrequency::Daily,
            priority: 0.8,
        }]);
        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=&lt;2&gt;</loc>"));
    }
}
