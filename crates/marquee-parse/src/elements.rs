use serde::{Deserialize, Serialize};

/// Title information extracted from a single video filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    /// The filename exactly as given (may still carry directory segments).
    pub original_name: String,
    /// Title-cased title with release metadata removed. May be empty.
    pub clean_title: String,
    /// Release year, when a 19xx/20xx token was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Part, season or sequel number (e.g. "2" for "Part 2").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    /// Trailing `-GROUP` release tag, lower-cased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    /// Search queries in priority order: longest first, unique ignoring case.
    /// Always contains `clean_title`.
    pub title_variations: Vec<String>,
}

impl ParsedName {
    /// The final path segment of `original_name`.
    pub fn file_name(&self) -> &str {
        final_segment(&self.original_name)
    }
}

/// Last `/`- or `\`-separated segment of a path-like string.
pub(crate) fn final_segment(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
