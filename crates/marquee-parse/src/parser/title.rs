use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::keyword;

/// Roman numerals from 2 to 39 ("ii", "iv", "xiii", ...).
static RE_ROMAN_NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^x{0,3}(?:ix|iv|v?i{0,3})$").unwrap());

/// Turn cleaned, lower-cased text into a display title.
///
/// Pure numbers are dropped, as are short connectives ("to", "by", ...)
/// that are not significant articles. Every remaining word is capitalized,
/// except roman numerals, which are upper-cased ("Rocky II").
pub fn build_title(cleaned: &str) -> String {
    cleaned
        .split(' ')
        .filter(|w| !w.is_empty())
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| w.chars().count() > 3 || !keyword::is_common_word(w))
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    if is_roman_numeral(word) {
        return word.to_uppercase();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn is_roman_numeral(word: &str) -> bool {
    word.len() >= 2 && RE_ROMAN_NUMERAL.is_match(&word.to_lowercase())
}

/// Derive search queries from a clean title, longest first.
///
/// Includes the full title, its 2..=5 word prefixes, its 2..=4 word
/// suffixes (only when at least two words precede them), and the title
/// without its first word when that word is not a significant article.
pub fn title_variations(clean_title: &str) -> Vec<String> {
    let words: Vec<&str> = clean_title.split(' ').collect();
    let n = words.len();

    let mut candidates = vec![clean_title.to_string()];

    for i in 2..=n.min(5) {
        candidates.push(words[..i].join(" "));
    }

    for i in 2..=n.min(4) {
        if n - i >= 2 {
            candidates.push(words[n - i..].join(" "));
        }
    }

    if n > 2 && !keyword::is_significant_word(words[0]) {
        candidates.push(words[1..].join(" "));
    }

    let mut seen = HashSet::new();
    let mut variations: Vec<String> = candidates
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect();

    // Stable: equal-length entries keep insertion order.
    variations.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    variations
}
