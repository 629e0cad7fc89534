//! HTML projection of the menu.
//!
//! Markup follows the site's existing stylesheet: `.toc-books` holds one
//! `.toc-book.dropdown` per group, each with a `button.toc-book-title`
//! controlling a `.toc-chapters.dropdown-content` container that carries
//! either `show` or `hidden`.

use std::fmt::Write as _;

use super::menu::{ItemKind, LoadStatus, Menu, MenuItem};
use crate::context::Theme;
use crate::headings::Heading;

/// Placeholder shown while a page's headings are being fetched.
pub const LOADING_PLACEHOLDER: &str = "<div><em>Loading...</em></div>";

/// Placeholder shown when a page has no headings.
pub const EMPTY_PLACEHOLDER: &str = "<div><em>No headings found.</em></div>";

/// Placeholder shown when fetching a page's headings failed.
pub const ERROR_PLACEHOLDER: &str = "<div>Error loading headings.</div>";

const COLLAPSED_INDICATOR: &str = "+";
const EXPANDED_INDICATOR: &str = "\u{2212}";

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full menu. `active_heading` highlights a heading of the
/// current page.
#[must_use]
pub fn render_menu_html(menu: &Menu, active_heading: Option<&str>) -> String {
    let mut html = String::from("<div class=\"toc-books\">\n");
    for root in menu.roots() {
        render_item(&mut html, menu, root, active_heading, 1);
        html.push_str("  <hr class=\"main-nav-divider\">\n");
    }
    html.push_str("</div>\n");
    html
}

/// Renders the theme toggle button for the active `theme`. The
/// `data-theme` attribute carries the class the document root should use.
#[must_use]
pub fn render_theme_toggle(theme: Theme) -> String {
    let label = theme.toggle_label();
    format!(
        "<button id=\"themeToggle\" class=\"theme-toggle\" data-theme=\"{}\" aria-label=\"{label}\" title=\"{label}\">{}</button>\n",
        theme.class_name(),
        theme.icon(),
    )
}

fn render_item(out: &mut String, menu: &Menu, item: &MenuItem, active: Option<&str>, depth: usize) {
    let pad = "  ".repeat(depth);
    let container = escape_html(&item.container_id());
    let visibility = if item.expanded { "show" } else { "hidden" };

    let _ = writeln!(out, "{pad}<div class=\"toc-book dropdown\">");
    match &item.kind {
        ItemKind::Group => {
            let _ = writeln!(
                out,
                "{pad}  <button class=\"toc-book-title dropdown-toggle\" aria-expanded=\"{}\" aria-controls=\"{container}\">{}</button>",
                item.expanded,
                escape_html(&item.title),
            );
        }
        ItemKind::Page { href } => {
            let class = if item.current {
                "toc-book-title dropdown-toggle active"
            } else {
                "toc-book-title dropdown-toggle"
            };
            let indicator = if item.expanded {
                EXPANDED_INDICATOR
            } else {
                COLLAPSED_INDICATOR
            };
            let _ = writeln!(
                out,
                "{pad}  <button class=\"{class}\" aria-expanded=\"{}\" aria-controls=\"{container}\"><span class=\"chapter-indicator\">{indicator}</span><span>{}</span></button>",
                item.expanded,
                escape_html(&item.title),
            );
            let _ = writeln!(
                out,
                "{pad}  <a class=\"toc-chapter-link\" href=\"{}\">{}</a>",
                escape_html(href),
                escape_html(&item.title),
            );
        }
    }

    let _ = writeln!(
        out,
        "{pad}  <div class=\"toc-chapters dropdown-content {visibility}\" id=\"{container}\">"
    );
    match &item.kind {
        ItemKind::Group => {
            for child in menu.children(item) {
                render_item(out, menu, child, active, depth + 2);
            }
        }
        ItemKind::Page { href } => {
            let inner = "  ".repeat(depth + 2);
            let page = (!item.current).then_some(href.as_str());
            match &item.load {
                LoadStatus::Unloaded => {}
                LoadStatus::Loading => {
                    let _ = writeln!(out, "{inner}{LOADING_PLACEHOLDER}");
                }
                LoadStatus::Failed(_) => {
                    let _ = writeln!(out, "{inner}{ERROR_PLACEHOLDER}");
                }
                LoadStatus::Loaded(headings) if headings.is_empty() => {
                    let _ = writeln!(out, "{inner}{EMPTY_PLACEHOLDER}");
                }
                LoadStatus::Loaded(headings) => {
                    for heading in headings {
                        let is_active = item.current && active == Some(heading.id.as_str());
                        let _ = writeln!(out, "{inner}{}", heading_row(heading, page, is_active));
                    }
                }
            }
        }
    }
    let _ = writeln!(out, "{pad}  </div>");
    let _ = writeln!(out, "{pad}</div>");
}

fn heading_row(heading: &Heading, page: Option<&str>, active: bool) -> String {
    let active = if active { " active" } else { "" };
    format!(
        "<div><a href=\"{}\" class=\"toc-link toc-h{}{active}\">{}</a></div>",
        escape_html(&heading.link(page)),
        heading.level,
        escape_html(&heading.text),
    )
}
