//! Library folder scanner and sequential batch driver.

use std::path::{Path, PathBuf};

use marquee_api::{PosterDownloader, TitleSearch};
use walkdir::WalkDir;

use crate::config::LibraryConfig;
use crate::error::MarqueeError;
use crate::models::ResolvedResult;
use crate::resolver::Resolver;

/// Outcome for one scanned file.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: Option<ResolvedResult>,
}

/// Result of resolving every video file under a library root.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub matched: u32,
    pub unmatched: u32,
}

/// Collect every video file under `root`, sorted by path.
///
/// Files are kept when their extension is in `config.extensions` (ignoring
/// case) and they are at least `config.min_file_size_mb` large. Anything
/// under the poster folder is skipped.
pub fn scan_library(root: &Path, config: &LibraryConfig) -> Result<Vec<PathBuf>, MarqueeError> {
    if !root.is_dir() {
        return Err(MarqueeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("library folder does not exist: {}", root.display()),
        )));
    }

    let min_bytes = config.min_file_size_mb * 1024 * 1024;
    let poster_dir = root.join(&config.poster_dir);
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.path() != poster_dir)
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                config
                    .extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(e))
            })
            .unwrap_or(false);
        if !is_video {
            continue;
        }

        if min_bytes > 0 {
            match entry.metadata() {
                Ok(m) if m.len() < min_bytes => {
                    tracing::debug!(path = %path.display(), size = m.len(), "Skipping small file");
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read file metadata");
                    continue;
                }
            }
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    tracing::info!(path = %root.display(), files = files.len(), "Library scanned");
    Ok(files)
}

/// Resolve every video file under `root`, one at a time.
pub async fn resolve_library<S, P>(
    resolver: &Resolver<S, P>,
    root: &Path,
    config: &LibraryConfig,
) -> Result<BatchReport, MarqueeError>
where
    S: TitleSearch,
    P: PosterDownloader,
{
    let mut report = BatchReport::default();

    for path in scan_library(root, config)? {
        let result = resolver.resolve_path(&path, root).await;
        if result.is_some() {
            report.matched += 1;
        } else {
            report.unmatched += 1;
        }
        report.entries.push(BatchEntry { path, result });
    }

    tracing::info!(
        matched = report.matched,
        unmatched = report.unmatched,
        "Library resolution complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use marquee_api::{MediaKind, SearchCandidate};
    use tempfile::TempDir;

    use super::*;
    use crate::config::AppConfig;
    use crate::store::ResultStore;

    fn library_config(min_file_size_mb: u64) -> LibraryConfig {
        LibraryConfig {
            min_file_size_mb,
            ..AppConfig::default().library
        }
    }

    fn create_file(dir: &Path, name: &str, bytes: usize) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(&vec![0u8; bytes]).unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "b/Heat.1995.mkv", 1);
        create_file(dir.path(), "Alien.1979.AVI", 1);
        create_file(dir.path(), "readme.txt", 1);
        create_file(dir.path(), "Posters/Heat_1995.mp4", 1);
        create_file(dir.path(), "a/Movie.mov", 1);

        let files = scan_library(dir.path(), &library_config(0)).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("Alien.1979.AVI"),
                PathBuf::from("a/Movie.mov"),
                PathBuf::from("b/Heat.1995.mkv"),
            ]
        );
    }

    #[test]
    fn test_scan_skips_small_files() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "sample.mkv", 1024);
        create_file(dir.path(), "Heat.1995.mkv", 1024 * 1024 + 1);

        let files = scan_library(dir.path(), &library_config(1)).unwrap();
        assert_eq!(files, vec![dir.path().join("Heat.1995.mkv")]);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = scan_library(&dir.path().join("absent"), &library_config(0));
        assert!(matches!(result, Err(MarqueeError::Io(_))));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    #[derive(Default)]
    struct CountingSearch {
        calls: AtomicUsize,
    }

    impl TitleSearch for CountingSearch {
        type Error = Offline;

        async fn search(
            &self,
            query: &str,
            _year: Option<u16>,
        ) -> Result<Vec<SearchCandidate>, Offline> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query != "Heat" {
                return Ok(Vec::new());
            }
            Ok(vec![SearchCandidate {
                title: "Heat".into(),
                media_kind: MediaKind::Movie,
                release_date: Some("1995-12-15".into()),
                first_air_date: None,
                poster_path: None,
            }])
        }
    }

    struct NoPosters;

    impl PosterDownloader for NoPosters {
        type Error = std::io::Error;

        async fn download(&self, _url: &str, _dest: &Path) -> Result<PathBuf, std::io::Error> {
            Err(std::io::Error::other("no posters in tests"))
        }
    }

    #[tokio::test]
    async fn test_resolve_library_counts() {
        let library = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        create_file(library.path(), "Heat.1995.mkv", 1);
        create_file(library.path(), "Unknown.Home.Video.mp4", 1);

        let resolver = Resolver::new(
            CountingSearch::default(),
            NoPosters,
            ResultStore::open(data.path().join("results.json")),
        );
        let report = resolve_library(&resolver, library.path(), &library_config(0))
            .await
            .unwrap();

        assert_eq!(report.matched, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(
            report.entries[0].result.as_ref().map(|r| r.title.as_str()),
            Some("Heat")
        );
        assert!(report.entries[1].result.is_none());
        assert_eq!(resolver.store().read_all().await.len(), 1);
    }
}
