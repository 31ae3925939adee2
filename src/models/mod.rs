use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical property category as stored by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Land,
    Commercial,
    Office,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Commercial,
        PropertyType::Office,
    ];

    /// Database value, e.g. `apartment`
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
            PropertyType::Office => "office",
        }
    }

    /// Map a flat SEO URL token to a property type.
    ///
    /// Matching is exact and case-sensitive; both singular and plural forms
    /// are accepted for apartments and houses.
    pub fn from_url_token(token: &str) -> Option<Self> {
        match token {
            "apartments" | "apartment" => Some(PropertyType::Apartment),
            "houses" | "house" => Some(PropertyType::House),
            "land" => Some(PropertyType::Land),
            "commercial" => Some(PropertyType::Commercial),
            "office" => Some(PropertyType::Office),
            _ => None,
        }
    }

    /// Token used when building flat SEO URLs
    pub fn url_token(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartments",
            PropertyType::House => "houses",
            other => other.as_str(),
        }
    }

    /// Plural display label used in page titles
    pub fn title_label(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartments",
            PropertyType::House => "Houses",
            PropertyType::Land => "Land",
            PropertyType::Commercial => "Commercial Properties",
            PropertyType::Office => "Office Spaces",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Sale,
    Rent,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Rent => "rent",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(TransactionType::Sale),
            "rent" => Ok(TransactionType::Rent),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A string that names none of an enum's variants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Listing record as supplied by the data layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub url_slug: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub scraped_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Create an active listing with nothing but an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: None,
            city: None,
            neighborhood: None,
            bedrooms: None,
            property_type: None,
            transaction_type: None,
            url_slug: None,
            active: true,
            scraped_at: None,
            last_seen_at: None,
        }
    }

    /// Most recent time the listing was confirmed live
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_seen_at.or(self.scraped_at)
    }
}

/// Structured query behind a flat SEO landing page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SeoPageFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_enum"
    )]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
}

impl SeoPageFilters {
    /// Bedroom count, treating zero as absent
    pub fn bedroom_count(&self) -> Option<u32> {
        self.bedrooms.filter(|count| *count > 0)
    }

    /// Check a listing against the filters the way the data layer does:
    /// city and state case-insensitively, type and bedrooms exactly.
    pub fn matches(&self, listing: &Listing) -> bool {
        fn same_place(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match (wanted, actual) {
                (None, _) => true,
                (Some(w), Some(a)) => w.to_lowercase() == a.to_lowercase(),
                (Some(_), None) => false,
            }
        }

        same_place(&self.city, &listing.city)
            && same_place(&self.state, &listing.state)
            && self
                .property_type
                .map_or(true, |kind| listing.property_type == Some(kind))
            && self
                .bedroom_count()
                .map_or(true, |count| listing.bedrooms == Some(count))
    }
}

/// Stored landing page definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeoPage {
    pub page_slug: String,
    #[serde(default)]
    pub filters: SeoPageFilters,
    #[serde(default)]
    pub listing_count: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Accept unknown enum strings from the backend as `None`
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

/// Accept RFC 3339 timestamps as well as naive ones (taken as UTC)
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| parse_timestamp(&value)))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
