use phf::phf_set;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in token dictionary shipped with the crate.
const DEFAULT_DICTIONARY: &str = include_str!("../dictionary.toml");

/// Small connective words dropped from titles when they are three letters or shorter.
pub static COMMON_WORDS: phf::Set<&'static str> = phf_set! {
    "for", "to", "in", "on", "at", "by", "from", "as", "into",
    "like", "than", "but", "or", "so",
};

/// Articles and conjunctions that are always kept, and never dropped from
/// the front of a title variation.
pub static SIGNIFICANT_WORDS: phf::Set<&'static str> = phf_set! {
    "a", "an", "the", "and", "with", "of",
};

/// The category a release-metadata token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    Resolution,
    Quality,
    Codec,
    ReleaseGroup,
    Audio,
    Misc,
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Quality => write!(f, "quality"),
            Self::Codec => write!(f, "codec"),
            Self::ReleaseGroup => write!(f, "release_group"),
            Self::Audio => write!(f, "audio"),
            Self::Misc => write!(f, "misc"),
        }
    }
}

/// Ordered regex fragments for one token class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenPatterns {
    pub class: TokenClass,
    pub patterns: Vec<String>,
}

/// A versioned set of release-metadata patterns.
///
/// Loaded once at startup, either the built-in copy or a user-supplied
/// TOML file with the same layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenDictionary {
    pub version: u32,
    pub classes: Vec<TokenPatterns>,
    /// Part / season / sequel patterns; group 1 captures the number.
    #[serde(default)]
    pub numbering: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {class} pattern {pattern:?}: {source}")]
    InvalidPattern {
        class: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{class} pattern {pattern:?} matches the empty string")]
    MatchesEmpty { class: String, pattern: String },

    #[error("numbering pattern {0:?} has no capture group")]
    MissingCapture(String),

    #[error("dictionary has no token patterns")]
    Empty,
}

impl TokenDictionary {
    /// The dictionary compiled into the crate.
    pub fn builtin() -> Self {
        toml::from_str(DEFAULT_DICTIONARY).expect("built-in dictionary is valid TOML")
    }

    /// Parse a dictionary document and check that every fragment compiles.
    pub fn from_toml_str(s: &str) -> Result<Self, DictionaryError> {
        let dictionary: TokenDictionary = toml::from_str(s)?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    pub fn validate(&self) -> Result<(), DictionaryError> {
        if self.classes.iter().all(|c| c.patterns.is_empty()) {
            return Err(DictionaryError::Empty);
        }

        for class in &self.classes {
            for pattern in &class.patterns {
                let re = Regex::new(pattern).map_err(|source| DictionaryError::InvalidPattern {
                    class: class.class.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
                if re.is_match("") {
                    return Err(DictionaryError::MatchesEmpty {
                        class: class.class.to_string(),
                        pattern: pattern.clone(),
                    });
                }
            }
        }

        for pattern in &self.numbering {
            let re = Regex::new(pattern).map_err(|source| DictionaryError::InvalidPattern {
                class: "numbering".into(),
                pattern: pattern.clone(),
                source,
            })?;
            if re.captures_len() < 2 {
                return Err(DictionaryError::MissingCapture(pattern.clone()));
            }
        }

        Ok(())
    }

    /// All token fragments in class order, then pattern order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .flat_map(|c| c.patterns.iter().map(String::as_str))
    }

    /// Patterns for a single class, if present.
    pub fn class(&self, class: TokenClass) -> Option<&TokenPatterns> {
        self.classes.iter().find(|c| c.class == class)
    }
}

impl Default for TokenDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whether a lower-cased word is a droppable connective.
pub fn is_common_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    COMMON_WORDS.contains(lower.as_str()) && !SIGNIFICANT_WORDS.contains(lower.as_str())
}

pub fn is_significant_word(word: &str) -> bool {
    SIGNIFICANT_WORDS.contains(word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary_validates() {
        let dict = TokenDictionary::builtin();
        assert_eq!(dict.version, 1);
        dict.validate().unwrap();
        assert_eq!(dict.classes.len(), 6);
        assert!(dict.numbering.len() >= 4);
    }

    #[test]
    fn test_every_class_present() {
        let dict = TokenDictionary::builtin();
        for class in [
            TokenClass::Resolution,
            TokenClass::Quality,
            TokenClass::Codec,
            TokenClass::ReleaseGroup,
            TokenClass::Audio,
            TokenClass::Misc,
        ] {
            let entry = dict.class(class).unwrap();
            assert!(!entry.patterns.is_empty(), "{class} has no patterns");
        }
    }

    #[test]
    fn test_custom_dictionary() {
        let dict = TokenDictionary::from_toml_str(
            r#"
            version = 7
            numbering = ['chapter\s*(\d+)']

            [[classes]]
            class = "codec"
            patterns = ['x264']
            "#,
        )
        .unwrap();
        assert_eq!(dict.version, 7);
        assert_eq!(dict.patterns().collect::<Vec<_>>(), vec!["x264"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = TokenDictionary::from_toml_str(
            r#"
            version = 1
            [[classes]]
            class = "misc"
            patterns = ['(unclosed']
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DictionaryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_numbering_needs_capture() {
        let err = TokenDictionary::from_toml_str(
            r#"
            version = 1
            numbering = ['part\s*\d+']
            [[classes]]
            class = "misc"
            patterns = ['proper']
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DictionaryError::MissingCapture(_)));
    }

    #[test]
    fn test_unknown_class_rejected() {
        let result = TokenDictionary::from_toml_str(
            r#"
            version = 1
            [[classes]]
            class = "subtitles"
            patterns = ['srt']
            "#,
        );
        assert!(matches!(result, Err(DictionaryError::Toml(_))));
    }

    #[test]
    fn test_empty_matching_pattern_rejected() {
        let err = TokenDictionary::from_toml_str(
            r#"
            version = 1
            [[classes]]
            class = "misc"
            patterns = ['proper', '(?:bonus)?']
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::MatchesEmpty { ref pattern, .. } if pattern == "(?:bonus)?"
        ));
    }

    #[test]
    fn test_numbering_under_class_rejected() {
        // Keys after a [[classes]] header belong to that entry.
        let result = TokenDictionary::from_toml_str(
            r#"
            version = 1
            [[classes]]
            class = "misc"
            patterns = ['proper']
            numbering = ['part\s*(\d+)']
            "#,
        );
        assert!(matches!(result, Err(DictionaryError::Toml(_))));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let result = TokenDictionary::from_toml_str(
            r#"
            version = 1
            numbers = ['part\s*(\d+)']
            [[classes]]
            class = "misc"
            patterns = ['proper']
            "#,
        );
        assert!(matches!(result, Err(DictionaryError::Toml(_))));
    }

    #[test]
    fn test_word_sets() {
        assert!(is_common_word("for"));
        assert!(is_common_word("By"));
        assert!(!is_common_word("the"));
        assert!(!is_common_word("matrix"));
        assert!(is_significant_word("The"));
        assert!(!is_significant_word("for"));
    }
}
