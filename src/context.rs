//! Application context and theme preference.
//!
//! [`AppContext`] bundles what the renderer needs at initialisation: the
//! resolved theme, the navigation tree and the preference store.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;
use tracing::debug;

use crate::error::StoreError;
use crate::model::NavigationTree;
use crate::store::{PreferenceStore, keys, save_json};

/// Colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl Theme {
    /// Stored value for this theme.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Class applied to the document root.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Light => "theme-light",
            Self::Dark => "theme-dark",
        }
    }

    /// The opposite theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon for the toggle control.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Light => "\u{1f319}",
            Self::Dark => "\u{2600}\u{fe0f}",
        }
    }

    /// Label for the toggle control, describing the switch it performs.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Switch to dark mode",
            Self::Dark => "Switch to light mode",
        }
    }

    /// Resolves the effective theme: the stored preference if it parses,
    /// otherwise `system`.
    ///
    /// The stored value is normally JSON-encoded; bare strings written by
    /// older versions of the site are accepted too.
    #[must_use]
    pub fn resolve(store: &dyn PreferenceStore, system: Self) -> Self {
        match store.get(keys::THEME).map(|raw| raw.parse::<Self>()) {
            Some(Ok(theme)) => theme,
            Some(Err(raw)) => {
                debug!(value = %raw, "ignoring unrecognised stored theme");
                system
            }
            None => system,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    /// Accepts `light`/`dark`, the legacy `theme-` prefixed forms, and
    /// JSON-quoted values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().trim_matches('"');
        match value.strip_prefix("theme-").unwrap_or(value) {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(s.to_string()),
        }
    }
}

/// Shared state handed to the renderer.
#[derive(Clone)]
pub struct AppContext {
    /// Active theme.
    pub theme: Theme,
    /// Navigation tree being rendered.
    pub tree: Arc<NavigationTree>,
    /// Preference store.
    pub store: Arc<dyn PreferenceStore>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("theme", &self.theme)
            .field("sections", &self.tree.sections.len())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Creates a context, resolving the theme from the store.
    #[must_use]
    pub fn new(tree: NavigationTree, store: Arc<dyn PreferenceStore>, system: Theme) -> Self {
        let theme = Theme::resolve(store.as_ref(), system);
        Self {
            theme,
            tree: Arc::new(tree),
            store,
        }
    }

    /// Switches to the opposite theme and persists the choice.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the choice cannot be persisted; the
    /// in-memory theme is still switched.
    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        self.set_theme(self.theme.toggled())
    }

    /// Sets and persists the theme.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the choice cannot be persisted.
    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme, StoreError> {
        self.theme = theme;
        save_json(self.store.as_ref(), keys::THEME, theme.as_str())?;
        Ok(theme)
    }
}
