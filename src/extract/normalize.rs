//! Name and free-text normalization
//!
//! The source pages are hand-edited, so names arrive with list numbering,
//! stray entities and inconsistent casing.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#?[a-zA-Z0-9]+;").unwrap());
static LIST_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s|\.|-|\*)*[0-9]+\s*(\.|-|\*)+").unwrap());
static LEADING_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0?[0-9]\s+").unwrap());
static OPEN_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)\(").unwrap());
static CLOSE_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)(\w)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static DASH_BETWEEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-(\w)").unwrap());
static DASH_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-\s+").unwrap());
static DASH_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+-(\w)").unwrap());
static COMMA_BETWEEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w),(\w)").unwrap());
static COMMA_SPACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+,\s").unwrap());
static COMMA_TRAILING: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s+").unwrap());

static TAG_INVALID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\-]+").unwrap());
static TAG_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Words kept lower-case when capitalizing a name
const CONNECTIVES: &[&str] = &[
    "an", "the", "and", "but", "or", "of", "nor", "for", "yet", "so", "as", "la", "del", "de",
];

const NAME_EDGE: &[char] = &['.', '!', '?', ',', '-', '*', ':', ';'];

/// Returns true for punctuation marks, leaving out math and currency symbols
pub fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_punctuation() && !matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~')
    } else {
        matches!(
            c,
            '¡' | '¿' | '«' | '»' | '‘' | '’' | '“' | '”' | '–' | '—' | '…' | '·'
        )
    }
}

/// Upper-cases the first letter, skipping opening brackets and quotes
pub fn capitalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut done = false;
    for c in text.chars() {
        if !done && c.is_alphanumeric() {
            result.extend(c.to_uppercase());
            done = true;
        } else {
            if !done && !matches!(c, '(' | '[' | '"' | '\'') {
                done = true;
            }
            result.push(c);
        }
    }
    result
}

/// Cleans up a place or route name
///
/// # Arguments
///
/// * `name` - Raw name as found on the page
/// * `capitalize_words` - Capitalize every word except short connectives
///
/// # Returns
///
/// The normalized name, or an empty string when nothing letter-like remains
pub fn normalize_name(name: &str, capitalize_words: bool) -> String {
    let name = HTML_ENTITY.replace_all(name, "");
    let name = LIST_NUMBERING.replace(&name, "");
    let name = name.trim().trim_matches(NAME_EDGE).trim();
    let name = OPEN_BRACKET.replace_all(name, "$1 (");
    let name = CLOSE_BRACKET.replace_all(&name, ") $1");
    let name = WHITESPACE.replace_all(&name, " ");

    if !name.chars().any(char::is_alphabetic) {
        return String::new();
    }

    let name = if capitalize_words {
        name.split(' ')
            .enumerate()
            .map(|(i, word)| {
                let lower = word.to_lowercase();
                if i > 0 && word.chars().count() <= 3 && CONNECTIVES.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize(word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        name.into_owned()
    };

    let name = capitalize(&name);
    LEADING_DIGIT.replace(&name, "").trim().to_string()
}

/// Cleans up a sentence-like text field
pub fn fix_punctuation(text: &str) -> String {
    let mut text = text.trim().to_string();
    if text == "[]" {
        return String::new();
    }
    if text.starts_with("http") {
        return text;
    }

    if text.starts_with('(') && ![")", ").", ")!", ")?"].iter().any(|end| text.ends_with(end)) {
        text.remove(0);
    }

    let text = HTML_ENTITY.replace_all(&text, "");
    let text = text.trim().trim_matches(&['-', '*', '+'][..]).trim();
    if text.chars().count() < 3 {
        return String::new();
    }

    let mut text = capitalize(text);
    if !text.chars().last().is_some_and(is_punctuation) {
        text.push('.');
    }

    let text = DASH_BETWEEN.replace_all(&text, "$1 - $2");
    let text = DASH_AFTER.replace_all(&text, "$1 - ");
    let text = DASH_BEFORE.replace_all(&text, " - $1");
    let text = COMMA_BETWEEN.replace_all(&text, "$1, $2");
    let text = COMMA_SPACED.replace_all(&text, ", ");
    COMMA_TRAILING.replace_all(&text, ", ").into_owned()
}

/// Turns a name into a lower-case tag slug
pub fn format_tag(text: &str) -> String {
    let tag = text.to_lowercase();
    let tag = TAG_INVALID.replace_all(&tag, "-");
    let tag = TAG_DASHES.replace_all(&tag, "-");
    tag.trim_matches('-').to_string()
}

/// Makes a display name safe to use as a folder name
pub fn path_component(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            ':' => Some('-'),
            '"' => Some('\''),
            '\\' | '/' | '*' | '?' | '>' | '<' | '|' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_strips_numbering_and_capitalizes() {
        assert_eq!(normalize_name("  3. el  capitan (face) ", true), "El Capitan (Face)");
    }

    #[test]
    fn test_normalize_name_keeps_connectives_lower() {
        assert_eq!(normalize_name("pared de la cova", true), "Pared de la Cova");
        assert_eq!(normalize_name("the nose", true), "The Nose");
    }

    #[test]
    fn test_normalize_name_without_capitalization() {
        assert_eq!(normalize_name("12 - la rambla", false), "La rambla");
        assert_eq!(normalize_name("Spigolo(direct)", false), "Spigolo (direct)");
    }

    #[test]
    fn test_normalize_name_rejects_letterless() {
        assert_eq!(normalize_name("12.", true), "");
        assert_eq!(normalize_name("&#160; --", true), "");
    }

    #[test]
    fn test_fix_punctuation() {
        assert_eq!(fix_punctuation("  steep limestone crag"), "Steep limestone crag.");
        assert_eq!(fix_punctuation("north-facing,shady!"), "North - facing, shady!");
        assert_eq!(fix_punctuation("(park at the gate"), "Park at the gate.");
        assert_eq!(fix_punctuation("[]"), "");
        assert_eq!(fix_punctuation("ok"), "");
        assert_eq!(fix_punctuation("http://example.com/topo"), "http://example.com/topo");
    }

    #[test]
    fn test_fix_punctuation_keeps_closing_marks() {
        assert_eq!(fix_punctuation("bring a rope (60m)"), "Bring a rope (60m)");
        assert_eq!(fix_punctuation("known as \"the cave\""), "Known as \"the cave\"");
        assert_eq!(fix_punctuation("sehr schön «Platte»"), "Sehr schön «Platte»");
        assert_eq!(fix_punctuation("parking costs 5$"), "Parking costs 5$.");
    }

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag("Costa Daurada"), "costa-daurada");
        assert_eq!(format_tag("  L'Olla -- (Sud) "), "l-olla-sud");
    }

    #[test]
    fn test_path_component() {
        assert_eq!(path_component("Siurana: \"El Pati\""), "Siurana- 'El Pati'");
        assert_eq!(path_component("A/B\\C?"), "ABC");
    }
}
