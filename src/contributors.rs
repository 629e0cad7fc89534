//! Contributor leaderboard.
//!
//! Fetches the repository's contributor list from the source-control API,
//! caches it in the preference store with a timestamp, and renders the
//! top entries as leaderboard table rows.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::{create_http_client, with_timeout};
use crate::renderer::escape_html;
use crate::store::{PreferenceStore, keys, load_json, save_json};

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default repository owner.
pub const DEFAULT_OWNER: &str = "COD1995";

/// Default repository name.
pub const DEFAULT_REPO: &str = "ml-meta";

/// Default cache lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Number of entries shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Markup shown when the list cannot be loaded.
pub const ERROR_HTML: &str = "<p class=\"error\">Unable to load contributor list</p>";

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// One contributor as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Account name.
    pub login: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Number of contributions.
    pub contributions: u64,
}

/// Stored contributor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorCache {
    /// Fetch time in milliseconds since the Unix epoch.
    pub when: i64,
    /// The fetched list.
    pub data: Vec<Contributor>,
}

impl ContributorCache {
    /// Returns `true` if the cache is younger than `ttl` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.timestamp_millis().saturating_sub(self.when);
        age >= 0 && u128::try_from(age).is_ok_and(|age| age < ttl.as_millis())
    }
}

/// Source of contributor data.
#[async_trait]
pub trait ContributorSource: Send + Sync {
    /// Fetches the full contributor list.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on timeout, bad status, or undecodable body.
    async fn fetch_contributors(&self) -> Result<Vec<Contributor>, FetchError>;
}

/// Contributor list from the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubContributors {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl GithubContributors {
    /// Creates a source for `{api_base}/repos/{owner}/{repo}/contributors`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be built.
    pub fn new(api_base: &str, owner: &str, repo: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_http_client()?,
            url: format!(
                "{}/repos/{owner}/{repo}/contributors",
                api_base.trim_end_matches('/')
            ),
            timeout,
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ContributorSource for GithubContributors {
    async fn fetch_contributors(&self) -> Result<Vec<Contributor>, FetchError> {
        debug!(url = %self.url, "fetching contributors");
        with_timeout(self.timeout, async {
            let response = self
                .client
                .get(&self.url)
                .header(reqwest::header::ACCEPT, "application/vnd.github+json")
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response
                .json::<Vec<Contributor>>()
                .await
                .map_err(|e| FetchError::InvalidResponse(e.to_string()))
        })
        .await
    }
}

/// Returns the cached list if fresh, otherwise fetches and caches it.
///
/// A cache write failure is logged and does not fail the call.
///
/// # Errors
///
/// Returns the source's [`FetchError`] when the cache is stale or absent
/// and the fetch fails.
pub async fn load_contributors(
    source: &dyn ContributorSource,
    store: &dyn PreferenceStore,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Vec<Contributor>, FetchError> {
    if let Some(cache) = load_json::<ContributorCache>(store, keys::CONTRIBUTORS) {
        if cache.is_fresh(now, ttl) {
            debug!(entries = cache.data.len(), "using cached contributors");
            return Ok(cache.data);
        }
    }

    let data = source.fetch_contributors().await?;
    info!(entries = data.len(), "fetched contributors");

    let cache = ContributorCache {
        when: now.timestamp_millis(),
        data,
    };
    if let Err(e) = save_json(store, keys::CONTRIBUTORS, &cache) {
        warn!(error = %e, "failed to cache contributors");
    }
    Ok(cache.data)
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedContributor {
    /// 1-based position.
    pub rank: usize,
    /// Medal for the top three.
    pub medal: Option<&'static str>,
    /// The contributor.
    #[serde(flatten)]
    pub contributor: Contributor,
}

/// Orders by contributions (highest first, ties keep API order) and keeps
/// the top [`LEADERBOARD_SIZE`].
#[must_use]
pub fn rank(mut list: Vec<Contributor>) -> Vec<RankedContributor> {
    list.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    list.into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(i, contributor)| RankedContributor {
            rank: i + 1,
            medal: MEDALS.get(i).copied(),
            contributor,
        })
        .collect()
}

fn avatar_src(url: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}s=80")
}

/// Renders leaderboard `<tr>` rows.
#[must_use]
pub fn render_rows(ranked: &[RankedContributor]) -> String {
    let mut html = String::new();
    for row in ranked {
        let login = escape_html(&row.contributor.login);
        let medal = row
            .medal
            .map(|m| format!("<span class=\"medal\">{m}</span>"))
            .unwrap_or_default();
        let _ = write!(
            html,
            "<tr>\n  <td class=\"number\">{}</td>\n  <td class=\"name\">\n    <div class=\"name-cell\">\n      <img class=\"avatar\" src=\"{}\" alt=\"{login} avatar\">\n      {login}\n    </div>\n  </td>\n  <td class=\"points\">{}{medal}</td>\n</tr>\n",
            row.rank,
            escape_html(&avatar_src(&row.contributor.avatar_url)),
            row.contributor.contributions,
        );
    }
    html
}
