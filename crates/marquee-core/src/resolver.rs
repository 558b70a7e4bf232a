//! Per-file resolution: cache check, then one search per title variation
//! until a candidate clears a confidence tier.

use std::path::{Path, PathBuf};

use marquee_api::poster::poster_file_name;
use marquee_api::{PosterDownloader, TitleSearch};
use marquee_parse::{Normalizer, ParsedName};

use crate::config::AppConfig;
use crate::error::MarqueeError;
use crate::models::ResolvedResult;
use crate::selector::{self, ExactTierPick, Selection};
use crate::store::ResultStore;

/// Default name of the poster folder under a library root.
pub const DEFAULT_POSTER_DIR: &str = "Posters";

/// Resolves filenames to titles through a search provider, caching every
/// successful answer.
pub struct Resolver<S, P> {
    search: S,
    posters: P,
    store: ResultStore,
    normalizer: Normalizer,
    pick: ExactTierPick,
    poster_dir: String,
}

impl<S: TitleSearch, P: PosterDownloader> Resolver<S, P> {
    pub fn new(search: S, posters: P, store: ResultStore) -> Self {
        Self {
            search,
            posters,
            store,
            normalizer: Normalizer::default(),
            pick: ExactTierPick::default(),
            poster_dir: DEFAULT_POSTER_DIR.to_string(),
        }
    }

    /// Build a resolver using the cache location, dictionary, tie-break
    /// policy and poster folder from `config`.
    pub fn from_config(config: &AppConfig, search: S, posters: P) -> Result<Self, MarqueeError> {
        Ok(Self::new(search, posters, ResultStore::open(config.results_path()))
            .with_normalizer(config.normalizer()?)
            .with_pick(config.matching.exact_tier_pick)
            .with_poster_dir(&config.library.poster_dir))
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_pick(mut self, pick: ExactTierPick) -> Self {
        self.pick = pick;
        self
    }

    pub fn with_poster_dir(mut self, dir: impl Into<String>) -> Self {
        self.poster_dir = dir.into();
        self
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Parse the final segment of `path` and resolve it.
    pub async fn resolve_path(&self, path: &Path, library_root: &Path) -> Option<ResolvedResult> {
        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = self.normalizer.parse(&original_name);
        self.resolve(&original_name, &parsed, library_root).await
    }

    /// Resolve one file. Returns `None` when every title variation has been
    /// tried without a candidate clearing the close-match threshold.
    ///
    /// Search, poster and cache-write failures are logged and never abort
    /// resolution.
    #[tracing::instrument(
        name = "resolve",
        skip(self, parsed, library_root),
        fields(title = %parsed.clean_title, year = ?parsed.year)
    )]
    pub async fn resolve(
        &self,
        original_name: &str,
        parsed: &ParsedName,
        library_root: &Path,
    ) -> Option<ResolvedResult> {
        if let Some(cached) = self.store.find(parsed).await {
            tracing::debug!(title = %cached.title, "Resolution cache hit");
            return Some(cached);
        }

        for variation in &parsed.title_variations {
            let candidates = match self.search.search(variation, parsed.year).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(query = %variation, error = %e, "Search failed");
                    Vec::new()
                }
            };
            tracing::debug!(query = %variation, count = candidates.len(), "Search returned");

            let scored = selector::score_candidates(candidates, variation, parsed.year);
            let Some(selection) = selector::select(scored, self.pick) else {
                continue;
            };

            tracing::info!(
                query = %variation,
                title = %selection.scored.candidate.title,
                year = selection.scored.year,
                score = selection.scored.score,
                tier = ?selection.tier,
                "Matched"
            );
            return Some(self.finish(original_name, parsed, selection, library_root).await);
        }

        tracing::info!(
            variations = parsed.title_variations.len(),
            "No match for any title variation"
        );
        None
    }

    async fn finish(
        &self,
        original_name: &str,
        parsed: &ParsedName,
        selection: Selection,
        library_root: &Path,
    ) -> ResolvedResult {
        let scored = selection.scored;
        let poster_path = self
            .fetch_poster(
                scored.candidate.poster_path.as_deref(),
                &scored.candidate.title,
                scored.year,
                library_root,
            )
            .await;

        let result = ResolvedResult {
            original_name: original_name.to_string(),
            release_date: scored.candidate.date().unwrap_or_default().to_string(),
            title: scored.candidate.title,
            media_kind: scored.candidate.media_kind,
            year_mismatch: parsed.year != Some(scored.year),
            poster_path,
        };

        if let Err(e) = self.store.append(&result).await {
            tracing::error!(
                path = %self.store.path().display(),
                error = %e,
                "Failed to write resolution cache"
            );
        }
        result
    }

    async fn fetch_poster(
        &self,
        poster_ref: Option<&str>,
        title: &str,
        year: u16,
        library_root: &Path,
    ) -> Option<PathBuf> {
        let url = self.search.poster_url(poster_ref?)?;
        let dest = library_root
            .join(&self.poster_dir)
            .join(poster_file_name(title, year));

        match self.posters.download(&url, &dest).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Poster download failed");
                None
            }
        }
    }
}
