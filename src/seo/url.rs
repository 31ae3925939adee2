use crate::models::{PropertyType, SeoPageFilters};
use crate::slug::title_case;
use serde::{Serialize, Serializer};
use std::ops::RangeInclusive;
use tracing::debug;

const BEDROOM_MARKER: &str = "bedroom";
const STATE_MARKER: &str = "state";
const BEDROOM_RANGE: RangeInclusive<u32> = 1..=10;

/// Why a flat SEO URL could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeoUrlError {
    #[error("Invalid bedroom count: {0}")]
    InvalidBedrooms(String),
    #[error("Invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("URL format not recognized")]
    UnrecognizedFormat,
}

/// Result of decoding a flat SEO URL.
///
/// When `is_valid` is false, `filters` may hold whatever was decoded before
/// the failure and should not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSeoUrl {
    pub filters: SeoPageFilters,
    /// Input without its leading slash
    pub slug: String,
    pub is_valid: bool,
    #[serde(serialize_with = "error_message", skip_serializing_if = "Option::is_none")]
    pub error: Option<SeoUrlError>,
}

fn error_message<S: Serializer>(
    error: &Option<SeoUrlError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Parse a flat SEO URL into page filters.
///
/// Accepted shapes:
///   /apartments-caracas            → {city: "Caracas", property_type: apartment}
///   /2-bedroom-apartments-caracas  → {city: "Caracas", property_type: apartment, bedrooms: 2}
///   /apartments-miranda-state      → {state: "Miranda", property_type: apartment}
pub fn parse_seo_url(slug: &str) -> ParsedSeoUrl {
    let clean = slug.strip_prefix('/').unwrap_or(slug);
    let tokens: Vec<&str> = clean.split('-').collect();

    let mut filters = SeoPageFilters::default();
    let error = decode(&tokens, &mut filters).err();

    if let Some(error) = &error {
        debug!("Rejected SEO URL {:?}: {}", clean, error);
    }

    ParsedSeoUrl {
        filters,
        slug: clean.to_string(),
        is_valid: error.is_none(),
        error,
    }
}

fn decode(tokens: &[&str], filters: &mut SeoPageFilters) -> Result<(), SeoUrlError> {
    let location = if tokens.len() >= 4 && tokens[1] == BEDROOM_MARKER {
        // {number}-bedroom-{type}-{location}
        let bedrooms = leading_integer(tokens[0])
            .filter(|count| BEDROOM_RANGE.contains(count))
            .ok_or_else(|| SeoUrlError::InvalidBedrooms(tokens[0].to_string()))?;
        filters.bedrooms = Some(bedrooms);
        filters.property_type = Some(property_type(tokens[2])?);
        &tokens[3..]
    } else if tokens.len() >= 2 {
        // {type}-{location}
        filters.property_type = Some(property_type(tokens[0])?);
        &tokens[1..]
    } else {
        return Err(SeoUrlError::UnrecognizedFormat);
    };

    match location.split_last() {
        Some((&STATE_MARKER, name)) => filters.state = Some(title_case(name)),
        _ => filters.city = Some(title_case(location)),
    }

    Ok(())
}

/// Read the integer a token starts with, ignoring whatever follows it.
///
/// Leading whitespace and a `+` sign are skipped, so `"2abc"` and `"3.5"`
/// read as 2 and 3. Values too large for `u32` read as `None`.
fn leading_integer(token: &str) -> Option<u32> {
    let rest = token.trim_start();
    let rest = rest.strip_prefix('+').unwrap_or(rest);
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    rest[..end].parse().ok()
}

fn property_type(token: &str) -> Result<PropertyType, SeoUrlError> {
    PropertyType::from_url_token(token)
        .ok_or_else(|| SeoUrlError::InvalidPropertyType(token.to_string()))
}

/// Build the flat SEO URL for a set of filters.
///
/// Missing fields are left out of the URL; a city wins over a state.
pub fn generate_seo_url(filters: &SeoPageFilters) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(bedrooms) = filters.bedroom_count() {
        parts.push(format!("{}-{}", bedrooms, BEDROOM_MARKER));
    }

    if let Some(kind) = filters.property_type {
        parts.push(kind.url_token().to_string());
    }

    let city = filters.city.as_deref().filter(|city| !city.is_empty());
    let state = filters.state.as_deref().filter(|state| !state.is_empty());

    if let Some(city) = city {
        parts.push(location_token(city));
    } else if let Some(state) = state {
        parts.push(location_token(state));
        parts.push(STATE_MARKER.to_string());
    }

    format!("/{}", parts.join("-"))
}

/// Lowercase a place name and turn each whitespace run into one hyphen
fn location_token(name: &str) -> String {
    let mut token = String::with_capacity(name.len());
    let mut in_space = false;

    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                token.push('-');
            }
            in_space = true;
        } else {
            token.push(c);
            in_space = false;
        }
    }

    token
}
