//! `headings`: list the table of contents of one page.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::{HeadingsArgs, OutputFormat};
use crate::config::{self, SiteConfig};
use crate::error::BooknavError;
use crate::fetch::{HttpFetcher, PageFetcher, SiteFetcher};
use crate::headings::extract_headings;

#[derive(Serialize)]
struct HeadingLink<'a> {
    level: u8,
    id: &'a str,
    text: &'a str,
    href: String,
}

/// Fetches the page and prints its level 2–3 headings.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched within the timeout.
pub async fn run(args: &HeadingsArgs) -> Result<(), BooknavError> {
    let config = match &args.site_root {
        Some(root) => config::resolve(root, None)?,
        None => SiteConfig::default(),
    };
    let timeout = args.timeout.unwrap_or(config.fetch_timeout);
    let content_class = args.content_class.as_deref().unwrap_or(&config.content_class);

    let fetcher: Box<dyn PageFetcher> = match &args.base_url {
        Some(base) => Box::new(HttpFetcher::new(base, timeout)?),
        None => Box::new(SiteFetcher::new(
            args.site_root.clone().unwrap_or_else(|| PathBuf::from(".")),
            timeout,
        )),
    };

    let html = fetcher.fetch(&args.href).await?;
    let headings = extract_headings(&html, content_class);
    let page = (!args.current).then_some(args.href.as_str());

    match args.format {
        OutputFormat::Human => {
            if headings.is_empty() {
                println!("No headings found.");
            }
            for h in &headings {
                let indent = if h.level > 2 { "  " } else { "" };
                println!("{indent}{}  {}", h.text, h.link(page));
            }
        }
        OutputFormat::Json => {
            let links: Vec<_> = headings
                .iter()
                .map(|h| HeadingLink {
                    level: h.level,
                    id: &h.id,
                    text: &h.text,
                    href: h.link(page),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&links)?);
        }
    }
    Ok(())
}
