use serde::Deserialize;

use crate::traits::{MediaKind, SearchCandidate};

// ── /search/multi response ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMultiResult>,
    pub total_results: Option<u32>,
}

/// One `/search/multi` hit. Movies carry `title`/`release_date`, shows
/// carry `name`/`first_air_date`, people carry neither date.
#[derive(Debug, Deserialize)]
pub struct TmdbMultiResult {
    pub id: u64,
    #[serde(default)]
    pub media_type: MediaKind,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
}

impl TmdbMultiResult {
    /// Convert to a provider-neutral candidate. Entries with neither a
    /// title nor a name are dropped.
    pub fn into_candidate(self) -> Option<SearchCandidate> {
        let title = self.title.or(self.name).filter(|t| !t.is_empty())?;
        Some(SearchCandidate {
            title,
            media_kind: self.media_type,
            release_date: self.release_date,
            first_air_date: self.first_air_date,
            poster_path: self.poster_path,
        })
    }
}
