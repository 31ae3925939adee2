use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block (U+0300..U+036F)
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Slugify a string: strip accents, lowercase, turn whitespace into hyphens
/// and drop everything that isn't an ASCII word character or a hyphen.
///
/// `"Cumbres de Curumo"` becomes `"cumbres-de-curumo"` and
/// `"Mérida"` becomes `"merida"`. Already slugified text is returned as is.
pub fn slugify(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_diacritic(*c)).collect();
    let lowered = stripped.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            // Separators only ever sit between two kept characters
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        }
    }

    slug
}

/// Join URL words with spaces, upper-casing the first letter of each.
///
/// Every word is treated the same, so `["cumbres", "de", "curumo"]`
/// gives `"Cumbres De Curumo"`.
pub fn title_case(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
