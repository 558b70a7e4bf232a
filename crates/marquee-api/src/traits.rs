//! Trait definitions for title-search providers and poster storage.
//!
//! The resolver only talks to these traits, so the TMDB client can be
//! swapped for another provider (or an in-process fake in tests).

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A free-text title search service.
pub trait TitleSearch: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search for movies and shows matching `query`, optionally narrowed
    /// to a release year.
    fn search(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> impl Future<Output = Result<Vec<SearchCandidate>, Self::Error>> + Send;

    /// Full URL of a provider poster reference, if the provider hosts images.
    fn poster_url(&self, poster_ref: &str) -> Option<String> {
        let _ = poster_ref;
        None
    }
}

/// Downloads an image to a local file.
pub trait PosterDownloader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch `url` and write it to `dest`, returning the path actually written.
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<PathBuf, Self::Error>> + Send;
}

/// Kind of media a search candidate refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    Person,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
            Self::Person => write!(f, "person"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One entry returned by a provider for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Movie title or show name.
    pub title: String,
    pub media_kind: MediaKind,
    /// ISO date of a movie release.
    pub release_date: Option<String>,
    /// ISO date of a show's first episode.
    pub first_air_date: Option<String>,
    /// Provider-relative poster reference (e.g. "/abc.jpg").
    pub poster_path: Option<String>,
}

impl SearchCandidate {
    /// The release date, falling back to the first-air date. Empty strings
    /// count as absent.
    pub fn date(&self) -> Option<&str> {
        [&self.release_date, &self.first_air_date]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|d| !d.is_empty())
    }

    /// Year taken from the leading four characters of [`Self::date`].
    pub fn year(&self) -> Option<u16> {
        self.date()?.get(..4)?.parse().ok()
    }
}
