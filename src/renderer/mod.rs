//! Navigation renderer.
//!
//! Projects a [`NavigationTree`](crate::model::NavigationTree) into a
//! collapsible menu with lazily loaded page headings and scroll-based
//! active-heading highlighting.

pub mod controller;
pub mod html;
pub mod menu;
pub mod scroll;

pub use controller::{CachedHeadings, NavController};
pub use html::{escape_html, render_menu_html, render_theme_toggle};
pub use menu::{ItemKind, LoadStatus, Menu, MenuItem, SectionState, ToggleEffect};
pub use scroll::{
    ActiveHeadingTracker, Debounce, HeadingPosition, ScrollSpy, ViewportEvent, spawn_scroll_spy,
};
