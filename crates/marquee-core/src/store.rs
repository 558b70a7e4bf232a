//! JSON-file resolution cache.
//!
//! The whole file is one JSON array of [`ResolvedResult`]. Every append
//! reads the current contents and rewrites the file in full; there is no
//! locking between processes.

use std::path::{Path, PathBuf};

use marquee_parse::ParsedName;

use crate::error::MarqueeError;
use crate::models::ResolvedResult;

/// Persisted list of previously resolved filenames.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every cached result in insertion order.
    ///
    /// A missing, empty or malformed file reads as empty; malformed content
    /// is logged, never returned as an error.
    pub async fn read_all(&self) -> Vec<ResolvedResult> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read results file");
                return Vec::new();
            }
        };

        if text.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<ResolvedResult>>(&text) {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Malformed results file, ignoring");
                Vec::new()
            }
        }
    }

    /// Append one result and rewrite the whole file.
    pub async fn append(&self, result: &ResolvedResult) -> Result<(), MarqueeError> {
        let mut results = self.read_all().await;
        results.push(result.clone());
        self.write_all(&results).await
    }

    async fn write_all(&self, results: &[ResolvedResult]) -> Result<(), MarqueeError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(results)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// First cached result matching `parsed` (see [`matches`]).
    pub async fn find(&self, parsed: &ParsedName) -> Option<ResolvedResult> {
        self.read_all()
            .await
            .into_iter()
            .find(|result| matches(parsed, result))
    }
}

/// Whether a cached result answers `parsed`.
///
/// Some title variation and the cached title (or cached file name) must
/// contain one another, ignoring case, and the years must agree when both
/// are known. Empty strings never match.
pub fn matches(parsed: &ParsedName, result: &ResolvedResult) -> bool {
    let cached_title = result.title.to_lowercase();
    let cached_name = result.original_name.to_lowercase();

    let overlaps = |variation: &str, cached: &str| {
        !variation.is_empty()
            && !cached.is_empty()
            && (cached.contains(variation) || variation.contains(cached))
    };

    let title_match = parsed
        .title_variations
        .iter()
        .map(|v| v.to_lowercase())
        .any(|v| overlaps(&v, &cached_title) || overlaps(&v, &cached_name));

    let year_match = match (parsed.year, result.year()) {
        (Some(parsed_year), Some(cached_year)) => parsed_year == cached_year,
        _ => true,
    };

    title_match && year_match
}
