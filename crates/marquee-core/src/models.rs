use std::path::PathBuf;

use marquee_api::{MediaKind, SearchCandidate};
use serde::{Deserialize, Serialize};

/// The persisted outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResult {
    /// File name the result was resolved from.
    pub original_name: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub media_kind: MediaKind,
    /// ISO date of release (movie) or first air date (show).
    #[serde(default)]
    pub release_date: String,
    /// The matched year differs from the filename year (or the filename had none).
    #[serde(default)]
    pub year_mismatch: bool,
    #[serde(default)]
    pub poster_path: Option<PathBuf>,
}

impl ResolvedResult {
    /// Year from the leading four characters of `release_date`.
    pub fn year(&self) -> Option<u16> {
        self.release_date.get(..4)?.parse().ok()
    }
}

/// A search candidate with its derived year and confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: SearchCandidate,
    pub year: u16,
    pub score: f64,
}
