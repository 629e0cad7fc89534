//! `contributors`: print the contributor leaderboard.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::cli::args::{ContributorsArgs, LeaderboardFormat};
use crate::config;
use crate::contributors::{ERROR_HTML, GithubContributors, load_contributors, rank, render_rows};
use crate::error::BooknavError;
use crate::store::MemoryStore;

/// Loads (or reuses the cached) contributor list and prints the top ten.
///
/// A fetch failure is reported in the output, never as a failing exit. An
/// unreadable store falls back to an uncached in-memory one.
///
/// # Errors
///
/// Returns an error only for invalid config.
pub async fn run(args: &ContributorsArgs) -> Result<(), BooknavError> {
    let config = config::resolve(&args.site.site_root, args.site.config.as_deref())?;
    let settings = &config.contributors;
    let owner = args.owner.as_deref().unwrap_or(&settings.owner);
    let repo = args.repo.as_deref().unwrap_or(&settings.repo);
    let api_base = args.api_base.as_deref().unwrap_or(&settings.api_base);

    let store = super::open_store(args.store.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "store unavailable, contributor list will not be cached");
        Arc::new(MemoryStore::new())
    });
    let source = GithubContributors::new(api_base, owner, repo, config.fetch_timeout)?;

    let list = match load_contributors(&source, store.as_ref(), settings.cache_ttl, Utc::now()).await {
        Ok(list) => list,
        Err(e) => {
            warn!(url = %source.url(), error = %e, "failed to load contributors");
            match args.format {
                LeaderboardFormat::Html => println!("{ERROR_HTML}"),
                LeaderboardFormat::Json => println!("[]"),
                LeaderboardFormat::Human => println!("Unable to load contributor list"),
            }
            return Ok(());
        }
    };

    let ranked = rank(list);
    match args.format {
        LeaderboardFormat::Human => {
            for row in &ranked {
                println!(
                    "{:>2}. {:<24} {:>6} {}",
                    row.rank,
                    row.contributor.login,
                    row.contributor.contributions,
                    row.medal.unwrap_or_default()
                );
            }
        }
        LeaderboardFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        LeaderboardFormat::Html => print!("{}", render_rows(&ranked)),
    }
    Ok(())
}
