use crate::models::{PropertyType, TransactionType};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

/// Structured hints pulled out of a free-text search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    pub remaining_keywords: String,
}

/// Options for [`SearchParser`]
#[derive(Debug, Clone, Default)]
pub struct SearchParserOptions {
    /// Also pull out bedroom and bathroom counts. Off by default since users
    /// read "2 bedroom" as an exact count, not a minimum.
    pub extract_rooms: bool,
}

const NUMBER_WORDS: &[(&str, u32)] = &[
    // English
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    // Spanish
    ("un", 1),
    ("una", 1),
    ("uno", 1),
    ("dos", 2),
    ("tres", 3),
    ("cuatro", 4),
    ("cinco", 5),
    ("seis", 6),
];

const COUNT: &str = r"(\d+|one|two|three|four|five|six|un|una|uno|dos|tres|cuatro|cinco|seis)";

struct Rule<T> {
    pattern: Regex,
    value: T,
}

impl<T: Copy> Rule<T> {
    fn new(pattern: &str, value: T) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid search pattern: {}", pattern))?;
        Ok(Self { pattern, value })
    }
}

/// Natural-language search parser (English and Spanish).
///
/// Rules run in order over the lowercased query; each rule blanks out what
/// it matched so later rules only see what's left.
pub struct SearchParser {
    property_types: Vec<Rule<PropertyType>>,
    transaction_types: Vec<Rule<TransactionType>>,
    furnished: Vec<Rule<bool>>,
    bedrooms: Regex,
    bathrooms: Regex,
    whitespace: Regex,
    options: SearchParserOptions,
}

impl SearchParser {
    /// Create a parser with default options
    pub fn new() -> Result<Self> {
        Self::with_options(SearchParserOptions::default())
    }

    /// Create a parser with custom options
    pub fn with_options(options: SearchParserOptions) -> Result<Self> {
        let property_types = vec![
            Rule::new(
                r"\b(apartment|apartments|apto|aptos|apartamento|apartamentos)\b",
                PropertyType::Apartment,
            )?,
            Rule::new(r"\b(house|houses|casa|casas)\b", PropertyType::House)?,
            Rule::new(r"\b(land|terreno|terrenos)\b", PropertyType::Land)?,
            Rule::new(r"\b(commercial|comercial|comerciales)\b", PropertyType::Commercial)?,
            Rule::new(r"\b(office|offices|oficina|oficinas)\b", PropertyType::Office)?,
        ];

        let transaction_types = vec![
            Rule::new(
                r"\b(for rent|to rent|rental|rentals|alquiler|en alquiler|para alquilar)\b",
                TransactionType::Rent,
            )?,
            Rule::new(
                r"\b(for sale|to buy|sale|venta|en venta|para vender)\b",
                TransactionType::Sale,
            )?,
        ];

        let furnished = vec![
            Rule::new(
                r"\b(furnished|amueblado|amueblada|amueblados|con muebles)\b",
                true,
            )?,
            Rule::new(r"\b(unfurnished|sin muebles|sin amueblar)\b", false)?,
        ];

        let bedrooms = Regex::new(&format!(
            r"\b{}\s*(?:bedroom|bedrooms|br|bed|hab|habitacion|habitaciones)\b",
            COUNT
        ))
        .context("Invalid bedroom pattern")?;
        let bathrooms = Regex::new(&format!(
            r"\b{}\s*(?:bathroom|bathrooms|ba|bath|baño|baños)\b",
            COUNT
        ))
        .context("Invalid bathroom pattern")?;
        let whitespace = Regex::new(r"\s+").context("Invalid whitespace pattern")?;

        Ok(Self {
            property_types,
            transaction_types,
            furnished,
            bedrooms,
            bathrooms,
            whitespace,
            options,
        })
    }

    /// Parse a free-text query like "casa en venta Valencia"
    pub fn parse(&self, query: &str) -> ParsedSearchQuery {
        let mut remaining = query.to_lowercase();

        let property_type = take_first(&self.property_types, &mut remaining);
        let transaction_type = take_first(&self.transaction_types, &mut remaining);
        let furnished = take_first(&self.furnished, &mut remaining);

        let (bedrooms, bathrooms) = if self.options.extract_rooms {
            let bedrooms = take_count(&self.bedrooms, &mut remaining);
            (bedrooms, take_count(&self.bathrooms, &mut remaining))
        } else {
            (None, None)
        };

        ParsedSearchQuery {
            bedrooms,
            bathrooms,
            property_type,
            transaction_type,
            furnished,
            remaining_keywords: self
                .whitespace
                .replace_all(remaining.trim(), " ")
                .into_owned(),
        }
    }
}

/// First rule that matches wins; every occurrence of its pattern is blanked
fn take_first<T: Copy>(rules: &[Rule<T>], remaining: &mut String) -> Option<T> {
    let rule = rules.iter().find(|rule| rule.pattern.is_match(remaining))?;
    *remaining = rule.pattern.replace_all(remaining, " ").into_owned();
    Some(rule.value)
}

/// Blank out the first count match and read its number
fn take_count(pattern: &Regex, remaining: &mut String) -> Option<u32> {
    let captures = pattern.captures(remaining)?;
    let whole = captures.get(0)?.range();
    let value = captures.get(1)?.as_str();

    let count = value.parse::<u32>().ok().or_else(|| {
        NUMBER_WORDS
            .iter()
            .find(|(word, _)| *word == value)
            .map(|(_, number)| *number)
    });

    remaining.replace_range(whole, " ");
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> ParsedSearchQuery {
        SearchParser::new().unwrap().parse(query)
    }

    #[test]
    fn extracts_type_and_keeps_location() {
        let parsed = parse("2 bedroom apartment Caracas");
        assert_eq!(parsed.property_type, Some(PropertyType::Apartment));
        assert_eq!(parsed.bedrooms, None);
        assert_eq!(parsed.remaining_keywords, "2 bedroom caracas");
    }

    #[test]
    fn spanish_query() {
        let parsed = parse("Casa en venta Valencia");
        assert_eq!(parsed.property_type, Some(PropertyType::House));
        assert_eq!(parsed.transaction_type, Some(TransactionType::Sale));
        assert_eq!(parsed.remaining_keywords, "valencia");
    }

    #[test]
    fn rent_and_furnished() {
        let parsed = parse("furnished oficina for rent  Chacao");
        assert_eq!(parsed.property_type, Some(PropertyType::Office));
        assert_eq!(parsed.transaction_type, Some(TransactionType::Rent));
        assert_eq!(parsed.furnished, Some(true));
        assert_eq!(parsed.remaining_keywords, "chacao");
    }

    #[test]
    fn unfurnished_is_not_read_as_furnished() {
        let parsed = parse("apto sin muebles");
        assert_eq!(parsed.furnished, Some(false));
        assert_eq!(parsed.remaining_keywords, "");
    }

    #[test]
    fn only_first_type_is_taken() {
        // Apartments are checked before houses
        let parsed = parse("house or apartment");
        assert_eq!(parsed.property_type, Some(PropertyType::Apartment));
        assert_eq!(parsed.remaining_keywords, "house or");
    }

    #[test]
    fn words_inside_other_words_are_left_alone() {
        let parsed = parse("Landmark Tower");
        assert_eq!(parsed.property_type, None);
        assert_eq!(parsed.remaining_keywords, "landmark tower");
    }

    #[test]
    fn rooms_when_enabled() {
        let parser = SearchParser::with_options(SearchParserOptions {
            extract_rooms: true,
        })
        .unwrap();

        let parsed = parser.parse("casa de tres habitaciones 2 baños en venta Valencia");
        assert_eq!(parsed.bedrooms, Some(3));
        assert_eq!(parsed.bathrooms, Some(2));
        assert_eq!(parsed.remaining_keywords, "de valencia");

        let parsed = parser.parse("furnished 1br for rent");
        assert_eq!(parsed.bedrooms, Some(1));
        assert_eq!(parsed.furnished, Some(true));
        assert_eq!(parsed.transaction_type, Some(TransactionType::Rent));
        assert_eq!(parsed.remaining_keywords, "");
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse("   "), ParsedSearchQuery::default());
    }
}
