use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::traits::PosterDownloader;

/// Characters that are not allowed in file names on at least one platform.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image server returned status {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request timeout used by [`HttpPosterDownloader::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads poster images over HTTP and writes them to disk.
#[derive(Debug, Clone)]
pub struct HttpPosterDownloader {
    http: Client,
}

impl HttpPosterDownloader {
    pub fn new() -> Result<Self, PosterError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Every request (connect through last body byte) is abandoned after
    /// `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, PosterError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl PosterDownloader for HttpPosterDownloader {
    type Error = PosterError;

    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, PosterError> {
        let path = strip_leading_dots(dest);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(PosterError::Status(resp.status().as_u16()));
        }
        let bytes = resp.bytes().await?;
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Poster saved");
        Ok(path)
    }
}

/// File name for a poster: `<title>_<year>.jpg`, with characters that
/// are invalid in file names removed.
pub fn poster_file_name(title: &str, year: u16) -> String {
    let safe: String = title
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect();
    format!("{}_{year}.jpg", safe.trim())
}

/// Remove leading dots from the file name so the poster is not hidden.
/// A name made only of dots becomes `poster.<ext>`.
pub fn strip_leading_dots(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let trimmed = name.trim_start_matches('.');
    if trimmed.len() == name.len() {
        return path.to_path_buf();
    }

    let cleaned = if trimmed.is_empty() {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
        {
            Some(ext) => format!("poster.{ext}"),
            None => "poster".to_string(),
        }
    } else {
        trimmed.to_string()
    };
    path.with_file_name(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_file_name() {
        assert_eq!(poster_file_name("The Matrix", 1999), "The Matrix_1999.jpg");
        assert_eq!(
            poster_file_name("Mission: Impossible", 1996),
            "Mission Impossible_1996.jpg"
        );
        assert_eq!(poster_file_name("AC/DC", 2010), "ACDC_2010.jpg");
    }

    #[test]
    fn test_strip_leading_dots() {
        assert_eq!(
            strip_leading_dots(Path::new("/lib/Posters/...And Justice_1979.jpg")),
            PathBuf::from("/lib/Posters/And Justice_1979.jpg")
        );
        assert_eq!(
            strip_leading_dots(Path::new("/lib/Posters/Heat_1995.jpg")),
            PathBuf::from("/lib/Posters/Heat_1995.jpg")
        );
    }

    #[test]
    fn test_strip_only_dots() {
        // Hidden-file semantics: ".jpg" has no extension, so the fallback is bare.
        assert_eq!(
            strip_leading_dots(Path::new("/lib/Posters/.jpg")),
            PathBuf::from("/lib/Posters/jpg")
        );
        assert_eq!(
            strip_leading_dots(Path::new("/lib/Posters/...")),
            PathBuf::from("/lib/Posters/poster")
        );
    }

    #[tokio::test]
    async fn test_download_failure_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Posters").join("Heat_1995.jpg");
        let downloader = HttpPosterDownloader::new().unwrap();

        // Bind and release a port so nothing is listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/heat.jpg");
        let result = downloader.download(&url, &dest).await;
        assert!(result.is_err());
        // Parent directory is created before the request is made.
        assert!(dir.path().join("Posters").is_dir());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Posters").join("Heat_1995.jpg");

        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let downloader = HttpPosterDownloader::with_timeout(Duration::from_millis(200)).unwrap();
        let url = format!("http://{addr}/heat.jpg");
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            downloader.download(&url, &dest),
        )
        .await
        .expect("download should give up on its own");

        match result {
            Err(PosterError::Http(e)) => assert!(e.is_timeout(), "unexpected error: {e}"),
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(!dest.exists());
        server.abort();
    }
}
