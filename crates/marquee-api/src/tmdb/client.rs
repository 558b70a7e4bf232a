use std::time::Duration;

use reqwest::Client;

use super::error::TmdbError;
use super::types::{TmdbMultiResult, TmdbSearchResponse};
use crate::traits::{SearchCandidate, TitleSearch};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

const USER_AGENT: &str = concat!("marquee/", env!("CARGO_PKG_VERSION"));

/// The Movie Database (TMDB) search client.
///
/// Accepts either a v3 API key (sent as `api_key`) or a v4 read access
/// token (sent as a bearer header).
pub struct TmdbClient {
    credential: String,
    base_url: String,
    image_base_url: String,
    language: String,
    include_adult: bool,
    http: Client,
}

impl TmdbClient {
    pub fn new(credential: String) -> Result<Self, TmdbError> {
        Self::with_timeout(credential, Duration::from_secs(30))
    }

    pub fn with_timeout(credential: String, timeout: Duration) -> Result<Self, TmdbError> {
        if credential.trim().is_empty() {
            return Err(TmdbError::MissingCredential);
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            credential: credential.trim().to_string(),
            base_url: DEFAULT_BASE_URL.into(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.into(),
            language: "en-US".into(),
            include_adult: false,
            http,
        })
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }

    /// v4 access tokens are JWTs; v3 keys are 32 hex characters.
    fn is_access_token(&self) -> bool {
        self.credential.starts_with("eyJ")
    }

    fn search_params(&self, query: &str, year: Option<u16>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", query.to_string()),
            ("include_adult", self.include_adult.to_string()),
            ("language", self.language.clone()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }
        if !self.is_access_token() {
            params.push(("api_key", self.credential.clone()));
        }
        params
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TMDB API error");
            Err(TmdbError::Api {
                status,
                message: body,
            })
        }
    }

    /// `GET /search/multi`: movies, shows and people in one list.
    pub async fn search_multi(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchCandidate>, TmdbError> {
        let mut req = self
            .http
            .get(format!("{}/search/multi", self.base_url))
            .query(&self.search_params(query, year));
        if self.is_access_token() {
            req = req.header("Authorization", format!("Bearer {}", self.credential));
        }

        let resp = Self::check_response(req.send().await?).await?;
        let search: TmdbSearchResponse = resp
            .json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))?;

        tracing::debug!(
            query,
            ?year,
            total = search.total_results.unwrap_or_default(),
            returned = search.results.len(),
            "TMDB search"
        );

        Ok(search
            .results
            .into_iter()
            .filter_map(TmdbMultiResult::into_candidate)
            .collect())
    }
}

impl TitleSearch for TmdbClient {
    type Error = TmdbError;

    async fn search(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchCandidate>, TmdbError> {
        self.search_multi(query, year).await
    }

    fn poster_url(&self, poster_ref: &str) -> Option<String> {
        if poster_ref.is_empty() {
            return None;
        }
        let sep = if poster_ref.starts_with('/') { "" } else { "/" };
        Some(format!("{}{sep}{poster_ref}", self.image_base_url))
    }
}
