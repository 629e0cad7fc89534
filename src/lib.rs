//! `booknav` - content discovery and navigation menus for static book sites
//!
//! The scanner walks a site's content roots at build time and emits the
//! navigation tree the browser loads. The renderer models the interactive
//! menu (collapsible sections, lazily loaded page headings, active-heading
//! tracking) independently of any DOM and projects it to HTML.

pub mod cli;
pub mod config;
pub mod context;
pub mod contributors;
pub mod error;
pub mod fetch;
pub mod headings;
pub mod model;
pub mod observability;
pub mod renderer;
pub mod scanner;
pub mod store;
