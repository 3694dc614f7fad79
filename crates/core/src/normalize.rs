//! Normalisation helpers shared by the validators and the conflict resolver.

/// Strips whitespace and hyphen separators from a provider identifier.
///
/// ```
/// use intake_core::normalize::normalize_identifier;
///
/// assert_eq!(normalize_identifier(" 123-456 7893 "), "1234567893");
/// ```
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Trims and uppercases a diagnosis code.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Trims, collapses internal whitespace and title-cases a display name.
///
/// A letter is capitalised at the start of each word and after a hyphen or apostrophe, so
/// `"  mary-jane  o'neil "` becomes `"Mary-Jane O'Neil"`. Every other letter is lowercased.
pub fn normalize_display_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut capitalise = true;
    for c in word.chars() {
        if capitalise {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        capitalise = matches!(c, '-' | '\'');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_strips_separators_only() {
        assert_eq!(normalize_identifier("1234-567-893"), "1234567893");
        assert_eq!(normalize_identifier("\t1234567893\n"), "1234567893");
        assert_eq!(normalize_identifier("12a4567893"), "12a4567893");
        assert_eq!(normalize_identifier(" - "), "");
    }

    #[test]
    fn code_is_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  j45.50 "), "J45.50");
    }

    #[test]
    fn display_name_is_title_cased() {
        assert_eq!(normalize_display_name("  jane   DOE "), "Jane Doe");
        assert_eq!(normalize_display_name("mary-jane o'neil"), "Mary-Jane O'Neil");
        assert_eq!(normalize_display_name("   "), "");
    }
}
