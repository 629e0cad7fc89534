//! `render`: print the navigation menu as HTML.

use std::sync::Arc;

use tracing::warn;

use crate::cli::args::RenderArgs;
use crate::config;
use crate::context::AppContext;
use crate::error::BooknavError;
use crate::fetch::{PageFetcher, SiteFetcher};
use crate::headings::extract_headings;
use crate::renderer::{NavController, render_menu_html, render_theme_toggle};
use crate::scanner::ContentScanner;

/// Scans the site, builds the menu, applies the requested toggles and
/// prints the resulting markup.
///
/// Remote heading fetches triggered by toggles are awaited before
/// rendering; failures show up as inline error placeholders.
///
/// # Errors
///
/// Returns an error for invalid config, an unreadable store file, or a
/// toggle naming an unknown item.
pub async fn run(args: &RenderArgs) -> Result<(), BooknavError> {
    let site_root = &args.site.site_root;
    let config = config::resolve(site_root, args.site.config.as_deref())?;
    let scanner = ContentScanner::new(site_root, config.scan_options())?;
    let tree = scanner.scan(&config.content_roots());

    let store = super::open_store(args.store.as_deref())?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(SiteFetcher::new(site_root, config.fetch_timeout));

    let current_headings = match &args.current {
        Some(href) => match fetcher.fetch(href).await {
            Ok(html) => extract_headings(&html, &config.content_class),
            Err(e) => {
                warn!(href = %href, error = %e, "could not read current page");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let ctx = AppContext::new(tree, store, args.system);
    let nav = NavController::render_root_menu(
        &ctx,
        args.current.as_deref(),
        current_headings,
        fetcher,
        &config.content_class,
    );

    if args.expand_all {
        nav.expand_all();
    }
    if args.collapse_all {
        nav.collapse_all();
    }
    for id in &args.toggles {
        nav.toggle(id)?;
    }
    nav.settle().await;

    if args.theme_toggle {
        print!("{}", render_theme_toggle(nav.theme()));
    }
    print!("{}", render_menu_html(&nav.snapshot(), args.active.as_deref()));
    Ok(())
}
