//! Page fetching for lazy heading inflation.
//!
//! Every fetch is bounded by a timeout; an elapsed timeout is a failure,
//! never a hang. Only same-origin relative hrefs are accepted.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;

/// Default timeout for page and API fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of chapter documents.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the document at `href` (relative to the site root).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on timeout, bad status, or transport failure.
    async fn fetch(&self, href: &str) -> Result<String, FetchError>;
}

/// Rejects absolute hrefs and hrefs that climb above the site root.
///
/// Strips any `#fragment` or `?query` suffix and returns the path part.
///
/// # Errors
///
/// Returns `FetchError::InvalidHref` for non same-origin hrefs.
pub fn validate_href(href: &str) -> Result<&str, FetchError> {
    let path = href.split(['#', '?']).next().unwrap_or_default();
    let invalid = || FetchError::InvalidHref(href.to_string());

    if path.is_empty() || path.contains("://") || path.starts_with("//") {
        return Err(invalid());
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }
    Ok(path)
}

/// Runs `fut` under `timeout`, mapping elapsed time to `FetchError::Timeout`.
///
/// # Errors
///
/// Returns `FetchError::Timeout` if the future does not finish in time,
/// otherwise whatever the future returned.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, FetchError>
where
    F: std::future::Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| FetchError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)))?
}

/// Creates the shared HTTP client used for page and API requests.
///
/// # Errors
///
/// Returns `FetchError::Network` if the client cannot be built.
pub fn create_http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))
}

/// Fetches pages over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher resolving hrefs against `base`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidHref` if `base` is not a URL, or
    /// `FetchError::Network` if the HTTP client cannot be built.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut base = Url::parse(base).map_err(|_| FetchError::InvalidHref(base.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: create_http_client()?,
            base,
            timeout,
        })
    }

    /// Resolves `href` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidHref` for non same-origin hrefs.
    pub fn resolve(&self, href: &str) -> Result<Url, FetchError> {
        let path = validate_href(href)?;
        self.base
            .join(path)
            .map_err(|_| FetchError::InvalidHref(href.to_string()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        let url = self.resolve(href)?;
        debug!(url = %url, "fetching page");

        with_timeout(self.timeout, async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response
                .text()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))
        })
        .await
    }
}

/// Reads pages from a local site directory.
#[derive(Debug, Clone)]
pub struct SiteFetcher {
    site_root: PathBuf,
    timeout: Duration,
}

impl SiteFetcher {
    /// Creates a fetcher reading from `site_root`.
    #[must_use]
    pub fn new(site_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            site_root: site_root.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        let path = self.site_root.join(validate_href(href)?);
        debug!(path = %path.display(), "reading page");

        with_timeout(self.timeout, async {
            tokio::fs::read_to_string(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::Status(404)
                } else {
                    FetchError::Io(e.to_string())
                }
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_href() {
        assert_eq!(
            validate_href("books/a/chapters/00.html#intro").unwrap(),
            "books/a/chapters/00.html"
        );
        assert_eq!(validate_href("./papers/x.html?v=1").unwrap(), "./papers/x.html");
        for bad in ["", "/etc/passwd", "../secret.html", "a/../../b.html", "https://evil.example/x", "//evil.example/x"] {
            assert!(
                matches!(validate_href(bad), Err(FetchError::InvalidHref(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_http_resolve_keeps_base_path() {
        let fetcher = HttpFetcher::new("https://example.org/ml-meta", DEFAULT_FETCH_TIMEOUT).unwrap();
        assert_eq!(
            fetcher.resolve("books/x.html").unwrap().as_str(),
            "https://example.org/ml-meta/books/x.html"
        );
    }

    #[test]
    fn test_http_rejects_bad_base() {
        assert!(HttpFetcher::new("not a url", DEFAULT_FETCH_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn test_site_fetcher_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("books")).unwrap();
        std::fs::write(dir.path().join("books/a.html"), "<h2>A</h2>").unwrap();

        let fetcher = SiteFetcher::new(dir.path(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(fetcher.fetch("books/a.html").await.unwrap(), "<h2>A</h2>");
        assert_eq!(
            fetcher.fetch("books/missing.html").await.unwrap_err(),
            FetchError::Status(404)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_elapses() {
        let result: Result<(), FetchError> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;
        assert_eq!(result.unwrap_err(), FetchError::Timeout(50));
    }
}
