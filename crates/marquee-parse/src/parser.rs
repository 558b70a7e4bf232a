pub mod title;

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::elements::{final_segment, ParsedName};
use crate::keyword::{DictionaryError, TokenDictionary};

/// A 19xx/20xx year bounded by delimiters, brackets or the string edge.
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s._\-(\[{])((?:19|20)\d{2})(?:$|[\s._\-)\]}])").unwrap()
});

static RE_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_.\-]").unwrap());

static RE_BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[({][^\])}]*[\])}]").unwrap());

static RE_BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

static RE_DELIMITER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s._\-]+").unwrap());

/// `<token>-<group>` at the very end of an extension-stripped name.
static RE_GROUP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s._])([a-z0-9]+)-([a-z0-9]+)$").unwrap());

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(|| {
    Normalizer::new(&TokenDictionary::builtin()).expect("built-in dictionary compiles")
});

/// Parse a video filename with the built-in token dictionary.
///
/// # Example
/// ```
/// let parsed = marquee_parse::parse("The.Matrix.1999.1080p.BluRay.x264-GROUP.mkv");
/// assert_eq!(parsed.clean_title, "The Matrix");
/// assert_eq!(parsed.year, Some(1999));
/// assert_eq!(parsed.part_number, None);
/// ```
pub fn parse(filename: &str) -> ParsedName {
    DEFAULT_NORMALIZER.parse(filename)
}

/// Filename normalizer compiled from a [`TokenDictionary`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    dictionary_version: u32,
    /// Any dictionary token with a delimiter (or edge) on both sides.
    tokens: Regex,
    /// A whole word that is exactly one dictionary token.
    whole_token: Regex,
    numbering: Vec<Regex>,
}

impl Normalizer {
    pub fn new(dictionary: &TokenDictionary) -> Result<Self, DictionaryError> {
        dictionary.validate()?;

        let alternation = dictionary
            .patterns()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|source| DictionaryError::InvalidPattern {
                class: "combined".into(),
                pattern,
                source,
            })
        };

        let tokens = compile(format!(r"(?i)(?:^|[\s_.\-])(?:{alternation})(?:$|[\s_.\-])"))?;
        let whole_token = compile(format!(r"(?i)^(?:{alternation})$"))?;
        let numbering = dictionary
            .numbering
            .iter()
            .map(|p| compile(format!("(?i){p}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            dictionary_version: dictionary.version,
            tokens,
            whole_token,
            numbering,
        })
    }

    pub fn dictionary_version(&self) -> u32 {
        self.dictionary_version
    }

    /// Whether `word` is exactly one release-metadata token.
    pub fn is_token(&self, word: &str) -> bool {
        self.whole_token.is_match(word)
    }

    /// Extract clean title, year, part number and title variations.
    ///
    /// Never fails: a name made only of metadata yields an empty title
    /// with a single empty variation.
    pub fn parse(&self, filename: &str) -> ParsedName {
        let file_name = final_segment(filename);
        let stem = strip_extension(file_name);
        let lowered = stem.nfkc().collect::<String>().to_lowercase();

        let release_group = self.trailing_release_group(&lowered);

        // Dot- and hyphen-delimited tags must be split before detection.
        let base = RE_DELIMITERS.replace_all(&lowered, " ");

        let year = extract_year(&base);
        let part_number = self.extract_part_number(&base);

        let cleaned = RE_BRACKETED.replace_all(&base, " ");
        let cleaned = self.strip_tokens(&cleaned);
        let cleaned = RE_BARE_NUMBER.replace_all(&cleaned, " ");
        let cleaned = RE_DELIMITER_RUN.replace_all(&cleaned, " ");
        let cleaned = strip_group_suffix(cleaned.trim(), release_group.as_deref());

        let clean_title = title::build_title(cleaned);
        let title_variations = title::title_variations(&clean_title);

        tracing::debug!(
            file = file_name,
            clean_title = %clean_title,
            ?year,
            ?part_number,
            variations = title_variations.len(),
            "Parsed filename"
        );

        ParsedName {
            original_name: filename.to_string(),
            clean_title,
            year,
            part_number,
            release_group,
            title_variations,
        }
    }

    fn extract_part_number(&self, base: &str) -> Option<String> {
        self.numbering.iter().find_map(|re| {
            re.captures(base)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
    }

    /// Remove every dictionary token. Adjacent tokens share a delimiter, so
    /// a single pass can miss every other one; repeat until nothing matches.
    /// Every pass that changes the text removes at least one word, so the
    /// word count bounds the passes.
    fn strip_tokens(&self, text: &str) -> String {
        let mut current = format!(" {text} ");
        let max_passes = text.split_whitespace().count() + 1;
        for _ in 0..max_passes {
            let next = self.tokens.replace_all(&current, "  ");
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        current
    }

    fn trailing_release_group(&self, lowered: &str) -> Option<String> {
        let caps = RE_GROUP_SUFFIX.captures(lowered)?;
        let tag = caps.get(1)?.as_str();
        let group = caps.get(2)?.as_str();
        let tag_is_metadata = self.is_token(tag) || tag.chars().all(|c| c.is_ascii_digit());
        // "dts-hd" is one token, not a tag followed by a group.
        let is_compound_token = self.is_token(&format!("{tag} {group}"));
        (tag_is_metadata && !is_compound_token).then(|| group.to_string())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

fn extract_year(base: &str) -> Option<u16> {
    RE_YEAR
        .captures(base)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Drop a short alphanumeric extension (".mkv", ".mp4"). Dots inside the
/// title ("Dr. Dolittle") and a trailing year ("Heat.1995") are kept.
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic()) =>
        {
            stem
        }
        _ => name,
    }
}

fn strip_group_suffix<'a>(cleaned: &'a str, group: Option<&str>) -> &'a str {
    let Some(group) = group else {
        return cleaned;
    };
    if cleaned == group {
        return "";
    }
    cleaned
        .strip_suffix(group)
        .and_then(|rest| rest.strip_suffix(' '))
        .map(str::trim_end)
        .unwrap_or(cleaned)
}
