use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use marquee_api::{HttpPosterDownloader, TmdbClient};
use marquee_parse::{Normalizer, TokenDictionary};
use serde::{Deserialize, Serialize};

use crate::error::MarqueeError;
use crate::selector::ExactTierPick;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Environment variable consulted when `tmdb.api_key` is empty.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub library: LibraryConfig,
    pub matching: MatchingConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub include_adult: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Video file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Poster subdirectory created under the scanned library root.
    pub poster_dir: String,
    /// Files smaller than this are skipped (samples, trailers).
    pub min_file_size_mb: u64,
    /// Override for the resolution cache location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_file: Option<PathBuf>,
    /// Directory scanned last; reused when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub exact_tier_pick: ExactTierPick,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Replacement token dictionary (TOML). Built-in when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise built-in defaults.
    pub fn load() -> Result<Self, MarqueeError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, MarqueeError> {
        if path.exists() {
            let user_str =
                std::fs::read_to_string(path).map_err(|e| MarqueeError::Config(e.to_string()))?;
            toml::from_str(&user_str).map_err(|e| MarqueeError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| MarqueeError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), MarqueeError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), MarqueeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MarqueeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory for the resolution cache and log files.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Location of the resolution cache file.
    pub fn results_path(&self) -> PathBuf {
        self.library
            .results_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("results.json"))
    }

    /// The configured API credential, falling back to `$TMDB_API_KEY`.
    pub fn api_credential(&self) -> Option<String> {
        let key = self.tmdb.api_key.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Build a TMDB client from the `[tmdb]` section.
    pub fn tmdb_client(&self) -> Result<TmdbClient, MarqueeError> {
        let credential = self
            .api_credential()
            .ok_or(marquee_api::TmdbError::MissingCredential)?;
        let client =
            TmdbClient::with_timeout(credential, self.request_timeout())?
                .base_url(&self.tmdb.base_url)
                .image_base_url(&self.tmdb.image_base_url)
                .language(&self.tmdb.language)
                .include_adult(self.tmdb.include_adult);
        Ok(client)
    }

    /// Poster downloader sharing the `[tmdb]` request timeout.
    pub fn poster_downloader(&self) -> Result<HttpPosterDownloader, MarqueeError> {
        Ok(HttpPosterDownloader::with_timeout(self.request_timeout())?)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb.timeout_secs)
    }

    /// Compile the configured token dictionary.
    pub fn normalizer(&self) -> Result<Normalizer, MarqueeError> {
        match &self.dictionary.path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let dictionary = TokenDictionary::from_toml_str(&text)?;
                tracing::info!(
                    path = %path.display(),
                    version = dictionary.version,
                    "Loaded token dictionary"
                );
                Ok(Normalizer::new(&dictionary)?)
            }
            None => Ok(Normalizer::default()),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "marquee")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
